//! Infrastructure layer: configuration, record storage, the external media
//! host, and the catalog lifecycle manager that ties them together.

pub mod config;
pub mod lifecycle;
pub mod media;
pub mod store;
