//! Entity and record traits: identity + how a record is persisted.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::id::EntityId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Every record shape the storefront persists.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Product,
    Category,
    Testimonial,
    User,
}

impl RecordKind {
    /// Storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Product => "product",
            RecordKind::Category => "category",
            RecordKind::Testimonial => "testimonial",
            RecordKind::User => "user",
        }
    }

    /// Capitalized name used in client-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Product => "Product",
            RecordKind::Category => "Category",
            RecordKind::Testimonial => "Testimonial",
            RecordKind::User => "User",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted document: an entity with a kind, an optional unique key, and a
/// creation timestamp used for newest-first listings.
///
/// Stores treat the record body as opaque JSON; only `id`, `KIND` and
/// `unique_key` are indexed.
pub trait Record:
    Entity<Id = EntityId> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: RecordKind;

    /// Key that must be unique within `KIND` (slug, email). `None` when the
    /// record shape has no unique key.
    fn unique_key(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> DateTime<Utc>;
}
