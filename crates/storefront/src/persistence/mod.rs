//! Best-effort persistence for session state.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the raw port: text values under string keys, the
//!   same contract as browser `localStorage`.
//! - [`Snapshot`] binds a store to one fixed key and handles JSON
//!   (de)serialization of a whole collection.
//! - Containers call [`Snapshot::load`] exactly once when they are opened and
//!   [`Snapshot::save`] after every mutation. They log and swallow failures;
//!   the in-memory collection stays authoritative for the session.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map, used by tests and ephemeral servers
//! - [`FileStore`] - one JSON file per key inside a state directory

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`] or while encoding a snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store refused the operation (quota, disabled, poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The collection could not be encoded as JSON.
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Text key-value storage.
///
/// Methods take `&self`; implementations use interior mutability so a
/// single store can back several containers.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Type-erased store shared between the containers of one server.
pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// Outcome of reading a snapshot, keeping absence and corruption apart.
#[derive(Debug)]
pub enum Hydration<T> {
    /// Nothing was stored under the key.
    Absent,
    /// The snapshot decoded. `skipped` counts entries that were null or did
    /// not match the expected shape and were dropped.
    Restored { items: Vec<T>, skipped: usize },
    /// Stored text was not a JSON array.
    Corrupt(String),
    /// The store itself failed.
    Unavailable(StorageError),
}

impl<T> Hydration<T> {
    /// Collapse into the collection a container starts with.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Restored { items, .. } => items,
            Self::Absent | Self::Corrupt(_) | Self::Unavailable(_) => Vec::new(),
        }
    }
}

/// A JSON array persisted under one fixed key.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    store: S,
    key: &'static str,
}

impl<S: KeyValueStore> Snapshot<S> {
    #[must_use]
    pub const fn new(store: S, key: &'static str) -> Self {
        Self { store, key }
    }

    /// The storage key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Read and decode the snapshot without collapsing failure modes.
    pub fn read<T: DeserializeOwned>(&self) -> Hydration<T> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Hydration::Absent,
            Err(e) => return Hydration::Unavailable(e),
        };

        let entries = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(other) => {
                return Hydration::Corrupt(format!("expected an array, found {}", kind(&other)));
            }
            Err(e) => return Hydration::Corrupt(e.to_string()),
        };

        let total = entries.len();
        let items: Vec<T> = entries
            .into_iter()
            .filter(|entry| !entry.is_null())
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        Hydration::Restored {
            skipped: total - items.len(),
            items,
        }
    }

    /// Load the collection, treating every failure as "no data".
    ///
    /// Absence is silent. Corruption and storage failures are logged at
    /// `warn` so they can be told apart from a fresh session.
    pub fn load<T: DeserializeOwned>(&self) -> Vec<T> {
        let hydration = self.read();
        match &hydration {
            Hydration::Absent => tracing::debug!(key = self.key, "no stored snapshot"),
            Hydration::Restored { items, skipped } => {
                if *skipped > 0 {
                    tracing::warn!(
                        key = self.key,
                        skipped,
                        "dropped malformed entries from stored snapshot"
                    );
                }
                tracing::debug!(key = self.key, restored = items.len(), "snapshot restored");
            }
            Hydration::Corrupt(reason) => {
                tracing::warn!(key = self.key, %reason, "stored snapshot is corrupt, starting empty");
            }
            Hydration::Unavailable(e) => {
                tracing::warn!(key = self.key, error = %e, "storage unavailable, starting empty");
            }
        }
        hydration.into_items()
    }

    /// Serialize the whole collection and write it under the key.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if encoding or the write fails.
    pub fn save<T: Serialize>(&self, items: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(self.key, &raw)
    }
}

const fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
