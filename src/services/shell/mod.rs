//! Offline shell: a versioned response cache in front of the asset origin.
//!
//! Lifecycle is `install` → `activate` → `handle`. Installing pre-caches the
//! shell manifest into the bucket named after [`SHELL_VERSION`]; activating
//! deletes every other bucket. Once active, navigations go network-first with
//! the cached `/index.html` as the offline fallback, and everything else goes
//! cache-first.

pub mod http;
pub mod memory;
pub mod sqlite;

use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{CacheKey, Destination, ShellRequest, ShellResponse};

pub use http::HttpNetwork;
pub use memory::MemoryCacheStorage;
pub use sqlite::SqliteCacheStorage;

pub const SHELL_VERSION: &str = "fademaster-shell-v1";

pub const SHELL_ASSETS: [&str; 6] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.ico",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

pub const OFFLINE_DOCUMENT: &str = "/index.html";
pub const IMAGE_PLACEHOLDER: &str = "/icons/icon-192x192.png";

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to install shell asset {asset}: {reason}")]
    Install { asset: String, reason: String },

    #[error("shell is {0:?}, cannot {1}")]
    InvalidState(ShellState, &'static str),

    #[error("offline and no cached copy of {0}")]
    Offline(String),
}

#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, NetworkError>;
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the bucket if it does not exist yet.
    async fn open(&self, bucket: &str) -> Result<(), CacheError>;
    async fn keys(&self) -> Result<Vec<String>, CacheError>;
    async fn delete(&self, bucket: &str) -> Result<bool, CacheError>;
    async fn put(
        &self,
        bucket: &str,
        key: &CacheKey,
        response: &ShellResponse,
    ) -> Result<(), CacheError>;
    async fn lookup(&self, bucket: &str, key: &CacheKey)
        -> Result<Option<ShellResponse>, CacheError>;
}

#[async_trait]
impl<T: Network + ?Sized> Network for Box<T> {
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, NetworkError> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<T: CacheStorage + ?Sized> CacheStorage for Box<T> {
    async fn open(&self, bucket: &str) -> Result<(), CacheError> {
        (**self).open(bucket).await
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys().await
    }

    async fn delete(&self, bucket: &str) -> Result<bool, CacheError> {
        (**self).delete(bucket).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &CacheKey,
        response: &ShellResponse,
    ) -> Result<(), CacheError> {
        (**self).put(bucket, key, response).await
    }

    async fn lookup(
        &self,
        bucket: &str,
        key: &CacheKey,
    ) -> Result<Option<ShellResponse>, CacheError> {
        (**self).lookup(bucket, key).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl ShellState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellState::Parsed => "parsed",
            ShellState::Installing => "installing",
            ShellState::Installed => "installed",
            ShellState::Activating => "activating",
            ShellState::Active => "active",
            ShellState::Redundant => "redundant",
        }
    }
}

pub struct OfflineShell<N: Network, C: CacheStorage> {
    version: String,
    network: N,
    cache: C,
    state: RwLock<ShellState>,
}

impl<N: Network, C: CacheStorage> OfflineShell<N, C> {
    pub fn new(network: N, cache: C) -> Self {
        Self::with_version(SHELL_VERSION, network, cache)
    }

    pub fn with_version(version: impl Into<String>, network: N, cache: C) -> Self {
        Self {
            version: version.into(),
            network,
            cache,
            state: RwLock::new(ShellState::Parsed),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> ShellState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: ShellState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Installs and activates straight away without waiting for an older
    /// shell to let go. If installing fails but a previous run already left a
    /// complete bucket for this version, that bucket is activated instead.
    pub async fn start(&self) -> Result<(), ShellError> {
        if let Err(e) = self.install().await {
            if !self.has_complete_bucket().await {
                return Err(e);
            }
            tracing::info!(version = %self.version, "reusing shell cached by a previous run");
            self.set_state(ShellState::Installed);
        }
        self.activate().await
    }

    async fn has_complete_bucket(&self) -> bool {
        for asset in SHELL_ASSETS {
            if self.cached(&CacheKey::get(asset)).await.is_none() {
                return false;
            }
        }
        true
    }

    /// Pre-caches every manifest asset. All of them are fetched before any is
    /// stored, so a failure leaves the bucket untouched.
    pub async fn install(&self) -> Result<(), ShellError> {
        let state = self.state();
        if !matches!(state, ShellState::Parsed | ShellState::Redundant) {
            return Err(ShellError::InvalidState(state, "install"));
        }
        self.set_state(ShellState::Installing);

        match self.precache().await {
            Ok(()) => {
                self.set_state(ShellState::Installed);
                self.announce_update().await;
                tracing::info!(version = %self.version, "offline shell installed");
                Ok(())
            }
            Err(e) => {
                self.set_state(ShellState::Redundant);
                tracing::warn!(version = %self.version, error = %e, "offline shell install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<(), ShellError> {
        self.cache.open(&self.version).await?;

        let mut fetched = Vec::with_capacity(SHELL_ASSETS.len());
        for asset in SHELL_ASSETS {
            let request = ShellRequest::get(asset);
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| ShellError::Install {
                    asset: asset.to_string(),
                    reason: e.to_string(),
                })?;
            if !response.is_success() {
                return Err(ShellError::Install {
                    asset: asset.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((request.cache_key(), response));
        }

        for (key, response) in &fetched {
            self.cache.put(&self.version, key, response).await?;
        }
        Ok(())
    }

    async fn announce_update(&self) {
        match self.cache.keys().await {
            Ok(keys) if keys.iter().any(|k| k != &self.version) => {
                tracing::info!(version = %self.version, "new shell content available, refresh to update");
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "could not list cache buckets"),
        }
    }

    /// Drops every bucket that is not this version's, then takes over
    /// request handling.
    pub async fn activate(&self) -> Result<(), ShellError> {
        let state = self.state();
        if state != ShellState::Installed {
            return Err(ShellError::InvalidState(state, "activate"));
        }
        self.set_state(ShellState::Activating);

        let purge = async {
            for bucket in self.cache.keys().await? {
                if bucket != self.version {
                    self.cache.delete(&bucket).await?;
                    tracing::info!(bucket = %bucket, "deleted stale shell cache");
                }
            }
            Ok::<(), CacheError>(())
        };

        if let Err(e) = purge.await {
            self.set_state(ShellState::Installed);
            return Err(e.into());
        }

        self.set_state(ShellState::Active);
        tracing::info!(version = %self.version, "offline shell active");
        Ok(())
    }

    /// Answers one intercepted request. Until the shell is active requests
    /// go straight to the network.
    pub async fn handle(&self, request: &ShellRequest) -> Result<ShellResponse, ShellError> {
        if self.state() != ShellState::Active {
            return Ok(self.network.fetch(request).await?);
        }

        if request.is_navigation() {
            self.handle_navigation(request).await
        } else {
            self.handle_subresource(request).await
        }
    }

    async fn handle_navigation(&self, request: &ShellRequest) -> Result<ShellResponse, ShellError> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store(&request.cache_key(), &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "navigation offline, serving cached shell");
                self.cached(&CacheKey::get(OFFLINE_DOCUMENT))
                    .await
                    .ok_or_else(|| ShellError::Offline(request.url.clone()))
            }
        }
    }

    async fn handle_subresource(&self, request: &ShellRequest) -> Result<ShellResponse, ShellError> {
        let key = request.cache_key();
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store(&key, &response).await;
                }
                Ok(response)
            }
            Err(e) if request.destination == Destination::Image => {
                tracing::debug!(url = %request.url, error = %e, "image offline, serving placeholder");
                self.cached(&CacheKey::get(IMAGE_PLACEHOLDER))
                    .await
                    .ok_or(ShellError::Network(e))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<ShellResponse> {
        match self.cache.lookup(&self.version, key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "cache lookup failed");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, response: &ShellResponse) {
        if let Err(e) = self.cache.put(&self.version, key, response).await {
            tracing::warn!(url = %key.url, error = %e, "cache write failed");
        }
    }
}
