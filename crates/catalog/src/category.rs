use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gemcart_core::{DomainError, DomainResult, Entity, EntityId, Record, RecordKind};

use crate::entity::CatalogEntity;
use crate::fields::{filled, non_blank, present};

/// A product category. At most one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload for a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Allow-listed update fields: `name`, `description`, `image`, `slug`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

impl Entity for Category {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Category {
    const KIND: RecordKind = RecordKind::Category;

    fn unique_key(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl CatalogEntity for Category {
    type Draft = NewCategory;
    type Patch = CategoryPatch;

    fn from_draft(id: EntityId, draft: NewCategory, now: DateTime<Utc>) -> DomainResult<Self> {
        let (Some(name), Some(slug)) = (filled(draft.name), filled(draft.slug)) else {
            return Err(DomainError::validation("Missing required fields (name, slug)"));
        };

        Ok(Self {
            id,
            name,
            slug,
            description: filled(draft.description),
            image: filled(draft.image),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_patch(&mut self, patch: CategoryPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let name = patch.name.map(|v| non_blank("name", v)).transpose()?;
        let slug = patch.slug.map(|v| non_blank("slug", v)).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(slug) = slug {
            self.slug = slug;
        }
        if let Some(description) = patch.description {
            self.description = filled(description);
        }
        if let Some(image) = patch.image {
            self.image = filled(image);
        }
        self.updated_at = now;
        Ok(())
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn media_refs(&self) -> Vec<&str> {
        self.image.as_deref().into_iter().collect()
    }
}
