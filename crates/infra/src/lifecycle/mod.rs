//! Catalog entity lifecycle (create / update / delete with media cleanup).
//!
//! ```text
//! create:  validate draft → reference checks → slug pre-check → insert
//! update:  load → apply allow-listed patch → reference checks → slug pre-check → update
//! delete:  load → resolve media ids → destroy remote media (best-effort) → delete record
//! ```
//!
//! The slug pre-check is check-then-write and can race; the store's unique
//! constraint backs it up and surfaces as the same `Conflict` error.
//!
//! Remote media cleanup never fails a delete. Unresolvable locators and failed
//! remote deletes are logged and collected as [`MediaWarning`]s in the
//! returned [`DeleteReport`]; orphaned remote assets are the accepted cost.

pub mod references;

pub use references::{ProductCategoryCheck, ReferenceCheck};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{info, instrument, warn};

use gemcart_catalog::CatalogEntity;
use gemcart_core::{DomainError, Entity, EntityId, Record};

use crate::media::{public_id_from_locator, DestroyOutcome, MediaError, MediaHost, MediaWarning};
use crate::store::{self, RecordStore, StoreError};

/// Lifecycle operation error.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Validation, not-found and conflict failures, with client-facing messages.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage failure or timeout; the operation was aborted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure outside storage, such as password hashing.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Timeouts and retry budget for remote media deletes.
#[derive(Debug, Clone, Copy)]
pub struct CleanupPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after the first for transient failures.
    pub max_retries: usize,
    /// First backoff delay; doubles per retry.
    pub backoff: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(100),
        }
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub id: EntityId,
    /// Remote deletes issued (one per resolvable locator).
    pub attempted: usize,
    /// Remote deletes the host confirmed.
    pub deleted: usize,
    pub warnings: Vec<MediaWarning>,
}

/// Create/update/delete for one catalog entity type.
pub struct LifecycleManager<E: CatalogEntity> {
    store: Arc<dyn RecordStore<E>>,
    media: Arc<dyn MediaHost>,
    references: Option<Arc<dyn ReferenceCheck<E>>>,
    cleanup: CleanupPolicy,
    store_timeout: Duration,
}

impl<E: CatalogEntity> LifecycleManager<E> {
    pub fn new(store: Arc<dyn RecordStore<E>>, media: Arc<dyn MediaHost>) -> Self {
        Self {
            store,
            media,
            references: None,
            cleanup: CleanupPolicy::default(),
            store_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_references(mut self, references: Arc<dyn ReferenceCheck<E>>) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    fn not_found() -> LifecycleError {
        DomainError::not_found(format!("{} not found", E::KIND.label())).into()
    }

    fn conflict() -> LifecycleError {
        DomainError::conflict(format!("{} with this slug already exists", E::KIND.label())).into()
    }

    /// Store errors, with unique violations turned into slug conflicts and
    /// vanished records into not-found.
    fn store_failure(err: StoreError) -> LifecycleError {
        match err {
            StoreError::UniqueViolation { .. } => Self::conflict(),
            StoreError::Missing { .. } => Self::not_found(),
            other => LifecycleError::Store(other),
        }
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, LifecycleError> {
        store::timed(self.store_timeout, operation, fut)
            .await
            .map_err(Self::store_failure)
    }

    /// `Conflict` when another record of this kind holds `slug`.
    async fn ensure_slug_free(&self, slug: &str, owner: EntityId) -> Result<(), LifecycleError> {
        let holder = self
            .timed("find_by_unique_key", self.store.find_by_unique_key(slug))
            .await?;
        match holder {
            Some(existing) if *existing.id() != owner => Err(Self::conflict()),
            _ => Ok(()),
        }
    }

    pub async fn get(&self, id: EntityId) -> Result<E, LifecycleError> {
        self.timed("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(Self::not_found)
    }

    pub async fn list(&self) -> Result<Vec<E>, LifecycleError> {
        self.timed("list", self.store.list()).await
    }

    #[instrument(skip(self, draft), fields(kind = %E::KIND), err)]
    pub async fn create(&self, draft: E::Draft) -> Result<E, LifecycleError> {
        let entity = E::from_draft(EntityId::new(), draft, Utc::now())?;

        if let Some(references) = &self.references {
            references.on_create(&entity).await?;
        }
        self.ensure_slug_free(entity.slug(), *entity.id()).await?;

        let stored = self.timed("insert", self.store.insert(entity)).await?;
        info!(id = %stored.id(), slug = stored.slug(), "created");
        Ok(stored)
    }

    #[instrument(skip(self, patch), fields(kind = %E::KIND, id = %id), err)]
    pub async fn update(&self, id: EntityId, patch: E::Patch) -> Result<E, LifecycleError> {
        let before = self.get(id).await?;
        let mut after = before.clone();
        after.apply_patch(patch, Utc::now())?;

        if let Some(references) = &self.references {
            references.on_update(&before, &after).await?;
        }
        if after.slug() != before.slug() {
            self.ensure_slug_free(after.slug(), id).await?;
        }

        let stored = self.timed("update", self.store.update(after)).await?;
        info!(slug = stored.slug(), "updated");
        Ok(stored)
    }

    #[instrument(skip(self), fields(kind = %E::KIND, id = %id), err)]
    pub async fn delete(&self, id: EntityId) -> Result<DeleteReport, LifecycleError> {
        let entity = self.get(id).await?;
        let report = self.cleanup_media(&entity).await;

        let removed = self.timed("delete", self.store.delete(id)).await?;
        if !removed {
            // Deleted concurrently between load and delete.
            return Err(Self::not_found());
        }

        info!(
            media_attempted = report.attempted,
            media_deleted = report.deleted,
            media_warnings = report.warnings.len(),
            "deleted"
        );
        Ok(report)
    }

    /// Best-effort removal of every remote asset the entity references.
    async fn cleanup_media(&self, entity: &E) -> DeleteReport {
        let id = *entity.id();
        let mut warnings = Vec::new();
        let mut public_ids = Vec::new();

        for locator in entity.media_refs() {
            match public_id_from_locator(locator) {
                Some(public_id) => public_ids.push(public_id),
                None => {
                    warn!(kind = %E::KIND, %id, locator, "cannot resolve media id from locator; skipping");
                    warnings.push(MediaWarning::Resolution {
                        locator: locator.to_string(),
                    });
                }
            }
        }

        let outcomes = join_all(public_ids.iter().map(|p| self.destroy_with_retry(p))).await;

        let mut deleted = 0;
        for (public_id, outcome) in public_ids.iter().zip(outcomes) {
            let reason = match outcome {
                Ok(DestroyOutcome::Deleted) => {
                    deleted += 1;
                    continue;
                }
                Ok(DestroyOutcome::NotFound) => "not found".to_string(),
                Ok(DestroyOutcome::Other(result)) => result,
                Err(e) => e.to_string(),
            };
            warn!(kind = %E::KIND, %id, public_id, reason, "remote media delete failed; continuing");
            warnings.push(MediaWarning::Deletion {
                public_id: public_id.clone(),
                reason,
            });
        }

        DeleteReport {
            id,
            attempted: public_ids.len(),
            deleted,
            warnings,
        }
    }

    async fn destroy_with_retry(&self, public_id: &str) -> Result<DestroyOutcome, MediaError> {
        let policy = self.cleanup;
        // Delays of `backoff`, 2x, 4x, ...: 2^n * (backoff / 2).
        let half = u64::try_from(policy.backoff.as_millis() / 2).unwrap_or(u64::MAX).max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(half)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(policy.max_retries);

        RetryIf::spawn(
            strategy,
            move || async move {
                match tokio::time::timeout(policy.timeout, self.media.destroy(public_id)).await {
                    Ok(result) => result,
                    Err(_) => Err(MediaError::Timeout(policy.timeout)),
                }
            },
            |e: &MediaError| {
                let retry = e.is_transient();
                if retry {
                    warn!(public_id, error = %e, "transient media host failure");
                }
                retry
            },
        )
        .await
    }
}
