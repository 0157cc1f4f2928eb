use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{KeyValueStorage, StorageError};

/// In-memory storage. Clones share the same map, which lets a test reopen a
/// store over what a previous one wrote.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
