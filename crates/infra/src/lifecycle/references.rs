//! Cross-record reference checks run by the lifecycle manager.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gemcart_catalog::{Category, Product};
use gemcart_core::{DomainError, EntityId};

use super::LifecycleError;
use crate::store::{self, RecordStore};

/// Entity-specific checks of references to other records.
#[async_trait]
pub trait ReferenceCheck<E>: Send + Sync {
    async fn on_create(&self, entity: &E) -> Result<(), LifecycleError>;

    /// Only references that changed need checking.
    async fn on_update(&self, before: &E, after: &E) -> Result<(), LifecycleError>;
}

/// A product's category must exist when the product is created or moved to
/// another category. Later category deletion is not prevented.
pub struct ProductCategoryCheck {
    categories: Arc<dyn RecordStore<Category>>,
    timeout: Duration,
}

impl ProductCategoryCheck {
    pub fn new(categories: Arc<dyn RecordStore<Category>>, timeout: Duration) -> Self {
        Self {
            categories,
            timeout,
        }
    }

    async fn ensure_exists(&self, id: EntityId) -> Result<(), LifecycleError> {
        let found = store::timed(self.timeout, "find_category", self.categories.find_by_id(id)).await?;

        match found {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Category not found").into()),
        }
    }
}

#[async_trait]
impl ReferenceCheck<Product> for ProductCategoryCheck {
    async fn on_create(&self, product: &Product) -> Result<(), LifecycleError> {
        self.ensure_exists(product.category).await
    }

    async fn on_update(&self, before: &Product, after: &Product) -> Result<(), LifecycleError> {
        if before.category == after.category {
            return Ok(());
        }
        self.ensure_exists(after.category).await
    }
}
