//! Wishlist route handlers.

use axum::{Json, extract::State};
use legora_core::{LineSelector, WishlistItem};
use serde::Serialize;
use tracing::instrument;

use crate::persistence::KeyValueStore;
use crate::session::{ToastKind, ToastOptions, WishlistStore};
use crate::state::AppState;

/// Wishlist as returned to clients.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistItem>,
    pub count: usize,
}

impl<S: KeyValueStore> From<&WishlistStore<S>> for WishlistView {
    fn from(wishlist: &WishlistStore<S>) -> Self {
        Self {
            items: wishlist.items().to_vec(),
            count: wishlist.count(),
        }
    }
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<WishlistView> {
    Json(WishlistView::from(&state.session().wishlist))
}

/// Save an item. Saving an item already on the list changes nothing.
#[instrument(skip(state, item), fields(product = %item.id))]
pub async fn add(
    State(state): State<AppState>,
    Json(item): Json<WishlistItem>,
) -> Json<WishlistView> {
    let mut session = state.session();
    let title = item.title.clone();
    if session.wishlist.add_item(item) {
        state.toasts().push(
            format!("Saved {title} to your wishlist"),
            ToastOptions::kind(ToastKind::Success),
        );
    }
    Json(WishlistView::from(&session.wishlist))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(selector): Json<LineSelector>,
) -> Json<WishlistView> {
    let mut session = state.session();
    session.wishlist.remove_item(&selector);
    Json(WishlistView::from(&session.wishlist))
}

#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<WishlistView> {
    let mut session = state.session();
    session.wishlist.clear();
    Json(WishlistView::from(&session.wishlist))
}
