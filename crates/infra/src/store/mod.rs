//! Record storage boundary.
//!
//! One generic, document-shaped store serves every record kind. Stores index
//! only the record id, its kind and its optional unique key (slug or email);
//! the rest of the record is opaque JSON.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use gemcart_core::{EntityId, Record, RecordKind};

/// Storage operation error.
///
/// These are **infrastructure errors**, as opposed to domain errors
/// (validation, missing fields).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage-level unique constraint on `(kind, unique_key)` fired.
    #[error("unique key '{key}' already taken for {kind}")]
    UniqueViolation { kind: RecordKind, key: String },

    /// `update` targeted a record that does not exist.
    #[error("{kind} {id} does not exist")]
    Missing { kind: RecordKind, id: EntityId },

    #[error("failed to (de)serialize {kind} record: {message}")]
    Serialization { kind: RecordKind, message: String },

    #[error("storage call '{0}' timed out")]
    Timeout(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Kind-scoped record store.
///
/// Implementations must:
/// - reject an `insert`/`update` whose unique key is already held by another
///   record of the same kind (`StoreError::UniqueViolation`)
/// - return `list` newest first (by `Record::created_at`)
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<R>, StoreError>;

    async fn find_by_unique_key(&self, key: &str) -> Result<Option<R>, StoreError>;

    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Replace the stored record with the same id.
    async fn update(&self, record: R) -> Result<R, StoreError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: EntityId) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<R>, StoreError>;
}

/// Run a store call under `limit`; an elapsed limit is `StoreError::Timeout(operation)`.
pub async fn timed<T>(
    limit: Duration,
    operation: &'static str,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout(operation))?
}
