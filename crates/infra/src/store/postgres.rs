//! Postgres-backed record store.
//!
//! All record kinds share the `records` table (see `migrations/`). The record
//! body lives in a JSONB `doc` column; `(kind, unique_key)` carries a unique
//! index so slug/email uniqueness holds even when two requests race past the
//! lifecycle manager's pre-check.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | Any other | `Backend` |
//! | PoolTimedOut | N/A | `Timeout` |
//! | Other | N/A | `Backend` |

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use gemcart_core::{EntityId, Record};

use super::{RecordStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_records.sql");

/// Create the `records` table and its indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("schema setup failed: {e}")))?;
    Ok(())
}

/// Postgres store for one record kind.
///
/// Cloning is cheap: `PgPool` is reference counted.
#[derive(Debug)]
pub struct PostgresRecordStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresRecordStore<R> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<R> PostgresRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

impl<R: Record> PostgresRecordStore<R> {
    fn decode(row: &sqlx::postgres::PgRow) -> Result<R, StoreError> {
        let Json(record) = row
            .try_get::<Json<R>, _>("doc")
            .map_err(|e| StoreError::Serialization {
                kind: R::KIND,
                message: e.to_string(),
            })?;
        Ok(record)
    }

    fn encode(record: &R) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(record).map_err(|e| StoreError::Serialization {
            kind: R::KIND,
            message: e.to_string(),
        })
    }

    fn store_error(&self, operation: &str, record: Option<&R>, err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::UniqueViolation {
                    kind: R::KIND,
                    key: record
                        .and_then(|r| r.unique_key())
                        .unwrap_or_default()
                        .to_string(),
                }
            }
            sqlx::Error::PoolTimedOut => StoreError::Timeout("acquire_connection"),
            other => StoreError::Backend(format!("{operation}: {other}")),
        }
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for PostgresRecordStore<R> {
    #[instrument(skip(self), fields(kind = %R::KIND, id = %id), err)]
    async fn find_by_id(&self, id: EntityId) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT doc FROM records WHERE kind = $1 AND id = $2")
            .bind(R::KIND.as_str())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.store_error("find_by_id", None, e))?;

        row.as_ref().map(Self::decode).transpose()
    }

    #[instrument(skip(self), fields(kind = %R::KIND), err)]
    async fn find_by_unique_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT doc FROM records WHERE kind = $1 AND unique_key = $2")
            .bind(R::KIND.as_str())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.store_error("find_by_unique_key", None, e))?;

        row.as_ref().map(Self::decode).transpose()
    }

    #[instrument(skip(self, record), fields(kind = %R::KIND, id = %record.id()), err)]
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO records (kind, id, unique_key, doc, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(R::KIND.as_str())
        .bind(record.id().as_uuid())
        .bind(record.unique_key())
        .bind(Self::encode(&record)?)
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| self.store_error("insert", Some(&record), e))?;

        Ok(record)
    }

    #[instrument(skip(self, record), fields(kind = %R::KIND, id = %record.id()), err)]
    async fn update(&self, record: R) -> Result<R, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE records
            SET unique_key = $3, doc = $4, updated_at = now()
            WHERE kind = $1 AND id = $2
            "#,
        )
        .bind(R::KIND.as_str())
        .bind(record.id().as_uuid())
        .bind(record.unique_key())
        .bind(Self::encode(&record)?)
        .execute(&self.pool)
        .await
        .map_err(|e| self.store_error("update", Some(&record), e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                kind: R::KIND,
                id: *record.id(),
            });
        }
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = %R::KIND, id = %id), err)]
    async fn delete(&self, id: EntityId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE kind = $1 AND id = $2")
            .bind(R::KIND.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| self.store_error("delete", None, e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(kind = %R::KIND), err)]
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let rows = sqlx::query(
            "SELECT doc FROM records WHERE kind = $1 ORDER BY created_at DESC",
        )
        .bind(R::KIND.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.store_error("list", None, e))?;

        rows.iter().map(Self::decode).collect()
    }
}
