//! Integration tests for the Legora storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p legora-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_persistence` - cart and wishlist surviving a restart
//! - `checkout_flow` - orders and stock against the in-memory catalog
//! - `http_api` - the JSON API over a real listener

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use legora_storefront::backend::{Backend, InMemoryCatalog};
use legora_storefront::config::StorefrontConfig;
use legora_storefront::persistence::{FileStore, SharedStore};
use legora_storefront::state::AppState;

/// A scratch state directory removed on drop.
pub struct StateDir {
    path: PathBuf,
}

impl StateDir {
    #[must_use]
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("legora-it-{}", uuid::Uuid::new_v4()));
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(self.path.clone())
    }

    /// Write raw text where the store keeps `key`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be written.
    pub fn write_raw(&self, key: &str, contents: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.path)?;
        std::fs::write(self.path.join(format!("{key}.json")), contents)
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StateDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A storefront server listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub catalog: InMemoryCatalog,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start a server whose session is persisted in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn start(dir: &StateDir, catalog: InMemoryCatalog) -> std::io::Result<Self> {
        let config = StorefrontConfig {
            state_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        let store: SharedStore = Arc::new(dir.store());
        let state = AppState::with_parts(config, store, Backend::Memory(catalog.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = legora_storefront::app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            catalog,
            client: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}
