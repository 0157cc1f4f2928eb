use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::Connection;

use super::{CacheError, CacheStorage};
use crate::db::queries;
use crate::models::{CacheKey, ShellResponse};

/// Buckets persisted in `shell_buckets`/`shell_entries`, so the shell keeps
/// working offline across restarts.
#[derive(Clone)]
pub struct SqliteCacheStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCacheStorage {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Backend("database lock poisoned".to_string()))
    }
}

fn backend(e: impl std::fmt::Display) -> CacheError {
    CacheError::Backend(e.to_string())
}

#[async_trait]
impl CacheStorage for SqliteCacheStorage {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        queries::open_bucket(&*self.conn()?, bucket).map_err(backend)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        queries::bucket_names(&*self.conn()?).map_err(backend)
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        queries::delete_bucket(&*self.conn()?, bucket).map_err(backend)
    }

    async fn put(
        &self,
        bucket: &str,
        key: &CacheKey,
        response: &ShellResponse,
    ) -> Result<(), CacheError> {
        queries::put_entry(&*self.conn()?, bucket, &key.method, &key.url, response).map_err(backend)
    }

    async fn lookup(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<ShellResponse>, CacheError> {
        queries::get_entry(&*self.conn()?, bucket, &key.method, &key.url).map_err(backend)
    }
}
