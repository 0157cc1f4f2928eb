use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{CacheError, CacheStorage};
use crate::models::{CacheKey, ShellResponse};

type Buckets = BTreeMap<String, HashMap<CacheKey, ShellResponse>>;

/// Bucket storage held in memory. Clones share the same buckets.
#[derive(Clone, Default)]
pub struct MemoryCacheStorage {
    buckets: Arc<Mutex<Buckets>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>, CacheError> {
        self.buckets
            .lock()
            .map_err(|_| CacheError::Backend("cache lock poisoned".to_string()))
    }

    pub fn entry_count(&self, bucket: &str) -> usize {
        self.lock()
            .map(|buckets| buckets.get(bucket).map_or(0, |b| b.len()))
            .unwrap_or(0)
    }

    pub fn remove_entry(&self, bucket: &str, key: &CacheKey) -> bool {
        self.lock()
            .ok()
            .and_then(|mut buckets| buckets.get_mut(bucket).and_then(|b| b.remove(key)))
            .is_some()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        self.lock()?.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        Ok(self.lock()?.remove(bucket).is_some())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &CacheKey,
        response: &ShellResponse,
    ) -> Result<(), CacheError> {
        self.lock()?
            .entry(bucket.to_string())
            .or_default()
            .insert(key.clone(), response.clone());
        Ok(())
    }

    async fn lookup(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<ShellResponse>, CacheError> {
        Ok(self
            .lock()?
            .get(bucket)
            .and_then(|entries| entries.get(key))
            .cloned())
    }
}
