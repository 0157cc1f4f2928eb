use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::{KeyValueStorage, StorageError};
use crate::db::queries;

/// Key/value storage over the `kv` table. Shares its connection with the
/// shell cache.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(queries::get_value(&conn, key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        queries::set_value(&conn, key, value)?;
        Ok(())
    }
}
