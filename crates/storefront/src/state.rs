//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{Backend, InMemoryCatalog, RestCatalog};
use crate::config::StorefrontConfig;
use crate::persistence::{FileStore, SharedStore};
use crate::session::{Session, ToastBoard};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds the one shopper
/// session the server serves, the toast board of that session and the data
/// service client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    session: Mutex<Session<SharedStore>>,
    toasts: ToastBoard,
    backend: Backend,
}

impl AppState {
    /// Create application state backed by the file store in
    /// `config.state_dir` and the data service named in `config.backend`
    /// (in-memory when none is configured).
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store: SharedStore = Arc::new(FileStore::new(config.state_dir.clone()));
        let backend = config.backend.as_ref().map_or_else(
            || Backend::Memory(InMemoryCatalog::new()),
            |backend| Backend::Rest(RestCatalog::new(backend)),
        );
        Self::with_parts(config, store, backend)
    }

    /// Create application state from explicit parts.
    #[must_use]
    pub fn with_parts(config: StorefrontConfig, store: SharedStore, backend: Backend) -> Self {
        let session = Session::open(store);
        let toasts = session.toasts.clone();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                session: Mutex::new(session),
                toasts,
                backend,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the shopper session.
    ///
    /// The guard must be dropped before any `.await`.
    pub fn session(&self) -> MutexGuard<'_, Session<SharedStore>> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the session's toast board without locking the session.
    #[must_use]
    pub fn toasts(&self) -> &ToastBoard {
        &self.inner.toasts
    }

    /// Get a reference to the data service client.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }
}
