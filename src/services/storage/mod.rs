//! Durable key/value storage behind the booking store.
//!
//! Each key holds one whole JSON document and every write replaces it, so
//! atomicity is whatever a single `set` of the backend gives.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
