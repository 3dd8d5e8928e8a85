//! The contract shared by catalog entities that carry externally hosted media.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use gemcart_core::{DomainResult, EntityId, Record};

/// A slugged catalog record (product or category) whose images live on an
/// external media host.
///
/// Creation goes through a `Draft` (every field optional, presence checked in
/// [`CatalogEntity::from_draft`]); updates go through a `Patch` that names the
/// allow-listed fields. Keys outside the allow-list are ignored when the patch
/// is deserialized.
pub trait CatalogEntity: Record {
    type Draft: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    /// Validate a draft and build the record it describes.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> DomainResult<Self>;

    /// Apply the allow-listed fields present in `patch`.
    ///
    /// On error the record is left untouched.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> DomainResult<()>;

    fn slug(&self) -> &str;

    /// Media locators (URLs) owned by this record, in stored order.
    fn media_refs(&self) -> Vec<&str>;
}
