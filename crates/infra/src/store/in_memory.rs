use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use gemcart_core::{EntityId, Record};

use super::{RecordStore, StoreError};

/// In-memory record store for tests/dev.
///
/// The unique-key check runs under the write lock, so it behaves like the
/// Postgres unique index.
#[derive(Debug)]
pub struct InMemoryRecordStore<R> {
    inner: RwLock<HashMap<EntityId, R>>,
    writes: AtomicUsize,
}

impl<R> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful mutating calls (insert, update, delete).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<R> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

fn key_taken<R: Record>(map: &HashMap<EntityId, R>, record: &R) -> Option<String> {
    let key = record.unique_key()?;
    map.values()
        .any(|other| other.id() != record.id() && other.unique_key() == Some(key))
        .then(|| key.to_string())
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_unique_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|r| r.unique_key() == Some(key)).cloned())
    }

    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if let Some(key) = key_taken(&map, &record) {
            return Err(StoreError::UniqueViolation { kind: R::KIND, key });
        }
        map.insert(*record.id(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn update(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.contains_key(record.id()) {
            return Err(StoreError::Missing {
                kind: R::KIND,
                id: *record.id(),
            });
        }
        if let Some(key) = key_taken(&map, &record) {
            return Err(StoreError::UniqueViolation { kind: R::KIND, key });
        }
        map.insert(*record.id(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn delete(&self, id: EntityId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let removed = map.remove(&id).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut records: Vec<R> = map.values().cloned().collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records)
    }
}
