//! External media host boundary.
//!
//! Images are uploaded by the admin UI straight to the media host; the backend
//! only stores their URLs (locators) and removes remote assets when the owning
//! record is deleted.

pub mod cloudinary;
pub mod in_memory;
pub mod locator;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};
pub use in_memory::InMemoryMediaHost;
pub use locator::public_id_from_locator;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// What the media host reported for a destroy request that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    NotFound,
    /// Any other result string the host returned.
    Other(String),
}

/// Failure to get a definitive answer from the media host.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Transport(String),

    #[error("media host responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("media host call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected media host response: {0}")]
    Decode(String),
}

impl MediaError {
    /// Worth retrying: the host may answer differently next time.
    pub fn is_transient(&self) -> bool {
        match self {
            MediaError::Transport(_) | MediaError::Timeout(_) => true,
            MediaError::Status { status, .. } => *status == 429 || *status >= 500,
            MediaError::Decode(_) => false,
        }
    }
}

/// Remote image host.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Delete the asset identified by `public_id`.
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, MediaError>;
}

/// Non-fatal problems met while cleaning up a deleted record's media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaWarning {
    /// The locator did not yield a public id; no remote call was made.
    Resolution { locator: String },
    /// The remote delete failed or did not report `Deleted`.
    Deletion { public_id: String, reason: String },
}
