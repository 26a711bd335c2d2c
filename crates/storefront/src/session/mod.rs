//! Per-shopper session state.
//!
//! A [`Session`] owns the cart, wishlist and toast board of one shopper. It
//! is created explicitly (server start-up, one CLI invocation) from an
//! injected [`KeyValueStore`] and torn down by dropping it; nothing in this
//! module is a global.

pub mod cart;
pub mod toast;
pub mod wishlist;

pub use cart::{CART_STORAGE_KEY, CartStore};
pub use toast::{Toast, ToastBoard, ToastId, ToastKind, ToastOptions, ToastQueue};
pub use wishlist::{WISHLIST_STORAGE_KEY, WishlistStore};

use crate::persistence::KeyValueStore;

/// Cart, wishlist and toasts of a single shopper.
#[derive(Debug)]
pub struct Session<S> {
    pub cart: CartStore<S>,
    pub wishlist: WishlistStore<S>,
    pub toasts: ToastBoard,
}

impl<S: KeyValueStore + Clone> Session<S> {
    /// Open both persisted containers from `store`, each hydrating once.
    pub fn open(store: S) -> Self {
        Self {
            cart: CartStore::open(store.clone()),
            wishlist: WishlistStore::open(store),
            toasts: ToastBoard::new(),
        }
    }
}
