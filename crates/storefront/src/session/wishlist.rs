//! Wishlist state.

use legora_core::{LineKey, LineSelector, WishlistItem};

use crate::persistence::{KeyValueStore, Snapshot};

/// Storage key of the persisted wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "app_wishlist_v1";

/// Ordered wishlist items, unique per `(id, size)`, with the same
/// hydrate-once, write-through persistence as the cart.
#[derive(Debug)]
pub struct WishlistStore<S> {
    items: Vec<WishlistItem>,
    snapshot: Snapshot<S>,
}

impl<S: KeyValueStore> WishlistStore<S> {
    /// Open the wishlist and hydrate it from `store`. Duplicate identities
    /// in the stored snapshot keep their first occurrence.
    pub fn open(store: S) -> Self {
        let snapshot = Snapshot::new(store, WISHLIST_STORAGE_KEY);
        let mut items: Vec<WishlistItem> = Vec::new();
        for item in snapshot.load::<WishlistItem>() {
            if !items.iter().any(|held| held.is(&item.key())) {
                items.push(item);
            }
        }
        tracing::debug!(items = items.len(), "wishlist opened");
        Self { items, snapshot }
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &LineKey) -> bool {
        self.items.iter().any(|item| item.is(key))
    }

    /// Add an item unless its identity is already present.
    ///
    /// Returns `true` if the item was inserted. A duplicate add is a no-op
    /// and does not touch storage.
    pub fn add_item(&mut self, item: WishlistItem) -> bool {
        if self.contains(&item.key()) {
            return false;
        }
        self.items.push(item);
        self.persist();
        true
    }

    /// Remove every item the selector matches.
    pub fn remove_item(&mut self, selector: &LineSelector) {
        self.items.retain(|item| !selector.matches(&item.key()));
        self.persist();
    }

    /// Empty the wishlist.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.snapshot.save(&self.items) {
            tracing::warn!(key = WISHLIST_STORAGE_KEY, error = %e, "failed to persist wishlist");
        }
    }
}
