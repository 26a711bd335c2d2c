//! Cart route handlers.
//!
//! Every mutation answers with the full cart so clients never need a second
//! round trip to re-render.

use axum::{Json, extract::State};
use legora_core::{CartLine, LineSelector, Price, ProductSnapshot};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::persistence::KeyValueStore;
use crate::session::{CartStore, ToastKind, ToastOptions};
use crate::state::AppState;

/// Cart as returned to clients.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub count: u64,
    pub total: Price,
}

impl<S: KeyValueStore> From<&CartStore<S>> for CartView {
    fn from(cart: &CartStore<S>) -> Self {
        Self {
            items: cart.lines().to_vec(),
            count: cart.count(),
            total: Price::new(cart.total()).unwrap_or(Price::ZERO),
        }
    }
}

/// One size and how many of it to add.
#[derive(Debug, Deserialize)]
pub struct SizeQuantity {
    pub size: String,
    pub qty: u32,
}

/// Add-to-cart request.
///
/// With `sizes`, one line per listed size is added and `qty` and the
/// product's own `size` are ignored.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    pub qty: Option<u32>,
    #[serde(default)]
    pub sizes: Vec<SizeQuantity>,
}

/// Show the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(&state.session().cart))
}

/// Add an item to the cart.
#[instrument(skip(state, req), fields(product = %req.product.id))]
pub async fn add(State(state): State<AppState>, Json(req): Json<AddToCart>) -> Json<CartView> {
    add_breadcrumb("cart", "Added item", Some(&[("product_id", req.product.id.as_str())]));

    let view = {
        let mut session = state.session();
        let added = if req.sizes.is_empty() {
            let qty = req.qty.unwrap_or(1);
            session.cart.add_item(req.product.clone(), qty);
            u64::from(qty)
        } else {
            let sizes: Vec<(String, u32)> =
                req.sizes.into_iter().map(|s| (s.size, s.qty)).collect();
            session.cart.add_sizes(&req.product, &sizes)
        };
        if added > 0 {
            state.toasts().push(
                format!("Added {} to cart", req.product.title),
                ToastOptions::kind(ToastKind::Success),
            );
        }
        CartView::from(&session.cart)
    };
    Json(view)
}

/// Remove lines from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(selector): Json<LineSelector>,
) -> Json<CartView> {
    let mut session = state.session();
    session.cart.remove_item(&selector);
    Json(CartView::from(&session.cart))
}

/// Increase quantity by one.
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Json(selector): Json<LineSelector>,
) -> Json<CartView> {
    let mut session = state.session();
    session.cart.increment(&selector);
    Json(CartView::from(&session.cart))
}

/// Decrease quantity by one, removing lines that reach zero.
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Json(selector): Json<LineSelector>,
) -> Json<CartView> {
    let mut session = state.session();
    session.cart.decrement(&selector);
    Json(CartView::from(&session.cart))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    let mut session = state.session();
    session.cart.clear();
    Json(CartView::from(&session.cart))
}
