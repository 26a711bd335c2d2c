//! Checkout route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::checkout::{CheckoutForm, OrderReceipt, submit_order};
use crate::error::{Result, add_breadcrumb};
use crate::session::{ToastKind, ToastOptions};
use crate::state::AppState;

/// Place a cash-on-delivery order for the current cart.
///
/// The session lock is released while the data service is called, then
/// taken again to clear the cart.
#[instrument(skip(state, form))]
pub async fn place(
    State(state): State<AppState>,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<OrderReceipt>> {
    let lines = state.session().cart.lines().to_vec();
    add_breadcrumb("checkout", "Submitted order", None);

    let receipt = submit_order(&lines, &form, None, state.backend()).await?;

    state.session().cart.clear();
    state.toasts().push(
        format!("Order {} placed. Pay on delivery.", receipt.order_id),
        ToastOptions::kind(ToastKind::Success),
    );
    Ok(Json(receipt))
}
