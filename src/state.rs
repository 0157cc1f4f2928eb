use std::sync::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::booking_store::BookingStore;
use crate::services::shell::{CacheStorage, Network, OfflineShell};
use crate::services::storage::SqliteStorage;

pub type AppStore = BookingStore<SqliteStorage>;
pub type AppShell = OfflineShell<Box<dyn Network>, Box<dyn CacheStorage>>;

pub struct AppState {
    pub config: AppConfig,
    pub store: Mutex<AppStore>,
    pub shell: AppShell,
}

impl AppState {
    pub fn store(&self) -> Result<MutexGuard<'_, AppStore>, AppError> {
        self.store.lock().map_err(|_| AppError::Poisoned)
    }
}
