//! Process-wide tracing setup shared by the binaries and tests.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Install the global subscriber, reading `RUST_LOG` and `LOG_FORMAT`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    crate::tracing::init(LogFormat::from_env());
}
