//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod wishlist;

use std::path::PathBuf;

use legora_storefront::backend::RestCatalog;
use legora_storefront::checkout::CheckoutError;
use legora_storefront::config::{ConfigError, StorefrontConfig};
use legora_storefront::persistence::FileStore;
use legora_storefront::session::Session;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("LEGORA_BACKEND_URL is not set; orders can only be placed with the data service")]
    NoBackend,

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Configuration and storage shared by every command.
pub struct Context {
    config: StorefrontConfig,
    store: FileStore,
}

impl Context {
    /// Load configuration from the environment, letting `state_dir`
    /// override `LEGORA_STATE_DIR`.
    pub fn load(state_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = StorefrontConfig::from_env()?;
        if let Some(dir) = state_dir {
            config.state_dir = dir;
        }
        Ok(Self::from_config(config))
    }

    /// Build a context from an already loaded configuration.
    pub fn from_config(config: StorefrontConfig) -> Self {
        let store = FileStore::new(config.state_dir.clone());
        tracing::debug!(dir = %store.dir().display(), "using state directory");
        Self { config, store }
    }

    /// Open the shopper session stored in the state directory.
    pub fn session(&self) -> Session<FileStore> {
        Session::open(self.store.clone())
    }

    /// The configured data service.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoBackend`] when no data service is
    /// configured. An order placed anywhere else would be lost once the
    /// command exits.
    pub fn backend(&self) -> Result<RestCatalog, CommandError> {
        self.config
            .backend
            .as_ref()
            .map(RestCatalog::new)
            .ok_or(CommandError::NoBackend)
    }
}
