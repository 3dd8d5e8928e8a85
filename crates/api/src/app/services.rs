use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use gemcart_auth::{hash_password_with_cost, PublicUser, Registration, User, PASSWORD_HASH_COST};
use gemcart_catalog::{Category, NewTestimonial, Product, Testimonial};
use gemcart_core::{DomainError, EntityId, Record};
use gemcart_infra::{
    config::AppConfig,
    lifecycle::{CleanupPolicy, LifecycleError, LifecycleManager, ProductCategoryCheck},
    media::{CloudinaryClient, InMemoryMediaHost, MediaHost},
    store::{self, postgres::ensure_schema, InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError},
};

/// Shared collaborators handed to every handler via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub categories: LifecycleManager<Category>,
    pub products: LifecycleManager<Product>,
    testimonials: Arc<dyn RecordStore<Testimonial>>,
    users: Arc<dyn RecordStore<User>>,
    store_timeout: Duration,
    password_cost: u32,
}

/// One store per record kind.
pub struct Stores {
    pub categories: Arc<dyn RecordStore<Category>>,
    pub products: Arc<dyn RecordStore<Product>>,
    pub testimonials: Arc<dyn RecordStore<Testimonial>>,
    pub users: Arc<dyn RecordStore<User>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            categories: Arc::new(InMemoryRecordStore::new()),
            products: Arc::new(InMemoryRecordStore::new()),
            testimonials: Arc::new(InMemoryRecordStore::new()),
            users: Arc::new(InMemoryRecordStore::new()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            categories: Arc::new(PostgresRecordStore::new(pool.clone())),
            products: Arc::new(PostgresRecordStore::new(pool.clone())),
            testimonials: Arc::new(PostgresRecordStore::new(pool.clone())),
            users: Arc::new(PostgresRecordStore::new(pool)),
        }
    }
}

impl AppServices {
    pub fn new(
        stores: Stores,
        media: Arc<dyn MediaHost>,
        store_timeout: Duration,
        cleanup: CleanupPolicy,
    ) -> Self {
        let categories = LifecycleManager::new(stores.categories.clone(), media.clone())
            .with_cleanup(cleanup)
            .with_store_timeout(store_timeout);
        let products = LifecycleManager::new(stores.products, media)
            .with_references(Arc::new(ProductCategoryCheck::new(
                stores.categories,
                store_timeout,
            )))
            .with_cleanup(cleanup)
            .with_store_timeout(store_timeout);

        Self {
            categories,
            products,
            testimonials: stores.testimonials,
            users: stores.users,
            store_timeout,
            password_cost: PASSWORD_HASH_COST,
        }
    }

    /// In-memory stores and media host with default timeouts (dev and tests).
    pub fn in_memory(media: InMemoryMediaHost) -> Self {
        Self::new(
            Stores::in_memory(),
            Arc::new(media),
            Duration::from_secs(5),
            CleanupPolicy::default(),
        )
    }

    /// bcrypt cost for new accounts; lowered in tests.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Wire the collaborators selected by `config`.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let stores = match &config.database {
            Some(db) => {
                let pool = PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .acquire_timeout(config.store_timeout)
                    .connect(&db.url)
                    .await
                    .context("failed to connect to postgres")?;
                ensure_schema(&pool).await.context("failed to prepare schema")?;
                info!(max_connections = db.max_connections, "using postgres record store");
                Stores::postgres(pool)
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory and lost on restart");
                Stores::in_memory()
            }
        };

        let media: Arc<dyn MediaHost> = match &config.cloudinary {
            Some(cloudinary) => {
                info!(cloud_name = %cloudinary.cloud_name, "using cloudinary media host");
                Arc::new(CloudinaryClient::new(cloudinary.clone()).context("failed to build media client")?)
            }
            None => {
                warn!("Cloudinary credentials not set; remote media is never deleted");
                Arc::new(InMemoryMediaHost::new())
            }
        };

        Ok(Self::new(stores, media, config.store_timeout, config.cleanup))
    }

    /// Testimonials, newest first.
    pub async fn testimonials_list(&self) -> Result<Vec<Testimonial>, LifecycleError> {
        Ok(store::timed(self.store_timeout, "list", self.testimonials.list()).await?)
    }

    pub async fn testimonial_create(&self, draft: NewTestimonial) -> Result<Testimonial, LifecycleError> {
        let testimonial = draft.into_testimonial(EntityId::new(), Utc::now())?;
        let stored = store::timed(self.store_timeout, "insert", self.testimonials.insert(testimonial)).await?;
        info!(id = %stored.id, "testimonial created");
        Ok(stored)
    }

    /// Register a storefront account with the `user` role.
    pub async fn register_user(&self, registration: Registration) -> Result<PublicUser, LifecycleError> {
        let valid = registration.validate()?;

        let taken = store::timed(
            self.store_timeout,
            "find_by_unique_key",
            self.users.find_by_unique_key(&valid.email),
        )
        .await?;
        if taken.is_some() {
            return Err(user_exists());
        }

        let password = valid.password.clone();
        let cost = self.password_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| LifecycleError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| LifecycleError::Internal(e.to_string()))?;

        let user = User::register(EntityId::new(), valid, hash, Utc::now());
        let stored = match store::timed(self.store_timeout, "insert", self.users.insert(user)).await {
            Ok(stored) => stored,
            Err(StoreError::UniqueViolation { .. }) => return Err(user_exists()),
            Err(e) => return Err(e.into()),
        };
        info!(id = %stored.id, kind = %User::KIND, "user registered");
        Ok(stored.public())
    }
}

fn user_exists() -> LifecycleError {
    DomainError::conflict("User already exists with this email").into()
}
