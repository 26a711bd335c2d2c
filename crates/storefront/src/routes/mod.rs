//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart
//! GET  /cart                   - Lines, count and total
//! POST /cart/add               - Add a product (or several sizes of it)
//! POST /cart/remove            - Remove lines matching { id, size? }
//! POST /cart/increment         - Quantity +1
//! POST /cart/decrement         - Quantity -1, removing at zero
//! POST /cart/clear             - Empty the cart
//!
//! # Wishlist
//! GET  /wishlist               - Saved items and count
//! POST /wishlist/add           - Save an item (idempotent)
//! POST /wishlist/remove        - Remove items matching { id, size? }
//! POST /wishlist/clear         - Empty the wishlist
//!
//! # Toasts
//! GET  /toasts                 - Visible toasts
//! POST /toasts                 - Show a toast
//! POST /toasts/{id}/dismiss    - Dismiss a toast early
//!
//! # Checkout
//! POST /checkout               - Place a cash-on-delivery order
//!
//! # Admin
//! POST /admin/products         - Create a product with per-size stock
//! POST /admin/categories       - Create a category
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod toasts;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/clear", post(cart::clear))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
}

/// Create the toast routes router.
pub fn toast_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(toasts::list).post(toasts::create))
        .route("/{id}/dismiss", post(toasts::dismiss))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route("/categories", post(admin::create_category))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/toasts", toast_routes())
        .route("/checkout", post(checkout::place))
        // TODO: put behind admin authentication once the storefront has accounts
        .nest("/admin", admin_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::backend::{Backend, InMemoryCatalog};
    use crate::config::StorefrontConfig;
    use crate::persistence::MemoryStore;
    use crate::state::AppState;

    fn state(catalog: InMemoryCatalog) -> AppState {
        AppState::with_parts(
            StorefrontConfig::default(),
            Arc::new(MemoryStore::new()),
            Backend::Memory(catalog),
        )
    }

    async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = crate::app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_cart_add_merges_and_reports_totals() {
        let state = state(InMemoryCatalog::new());
        let item = json!({ "id": "p1", "title": "Lawn Suit", "price": 2500, "qty": 2 });

        call(&state, "POST", "/cart/add", Some(item.clone())).await;
        let (status, cart) = call(&state, "POST", "/cart/add", Some(item)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["count"], 4);
        assert_eq!(cart["total"], 10000.0);
        assert_eq!(cart["items"].as_array().unwrap().len(), 1);
        assert_eq!(state.toasts().visible().len(), 2);
    }

    #[tokio::test]
    async fn test_cart_add_sizes_then_decrement() {
        let state = state(InMemoryCatalog::new());
        let body = json!({
            "id": "p2", "title": "Kurta", "price": 1200,
            "sizes": [{ "size": "M", "qty": 1 }, { "size": "L", "qty": 2 }]
        });
        let (_, cart) = call(&state, "POST", "/cart/add", Some(body)).await;
        assert_eq!(cart["count"], 3);

        let (_, cart) = call(&state, "POST", "/cart/decrement", Some(json!({ "id": "p2", "size": "M" }))).await;
        assert_eq!(cart["count"], 2);
        assert_eq!(cart["items"].as_array().unwrap().len(), 1);

        let (_, cart) = call(&state, "POST", "/cart/remove", Some(json!({ "id": "p2" }))).await;
        assert_eq!(cart["count"], 0);
    }

    #[tokio::test]
    async fn test_wishlist_add_is_idempotent() {
        let state = state(InMemoryCatalog::new());
        let item = json!({ "id": "p1", "title": "Shawl", "price": 900 });
        call(&state, "POST", "/wishlist/add", Some(item.clone())).await;
        let (_, wishlist) = call(&state, "POST", "/wishlist/add", Some(item)).await;
        assert_eq!(wishlist["count"], 1);

        let (_, wishlist) = call(&state, "POST", "/wishlist/clear", None).await;
        assert_eq!(wishlist["count"], 0);
    }

    #[tokio::test]
    async fn test_toast_create_list_dismiss() {
        let state = state(InMemoryCatalog::new());
        let (status, created) = call(
            &state,
            "POST",
            "/toasts",
            Some(json!({ "message": "Hello", "type": "error", "duration": 60000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_u64().unwrap();

        let (_, toasts) = call(&state, "GET", "/toasts", None).await;
        assert_eq!(toasts[0]["type"], "error");
        assert_eq!(toasts[0]["duration"], 60000);

        let uri = format!("/toasts/{id}/dismiss");
        let (status, _) = call(&state, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&state, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_checkout_flow() {
        let catalog = InMemoryCatalog::new().with_stock("p1", 3);
        let state = state(catalog.clone());
        call(
            &state,
            "POST",
            "/cart/add",
            Some(json!({ "id": "p1", "title": "Lawn Suit", "price": 2500, "qty": 2 })),
        )
        .await;

        let form = json!({
            "full_name": "Ayesha Khan",
            "email": "ayesha@example.com",
            "phone": "0300-1234567",
            "address": "12 Mall Road",
            "city": "Lahore",
            "postal_code": "54000"
        });
        let (status, receipt) = call(&state, "POST", "/checkout", Some(form.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(receipt["order_id"].is_string());
        assert_eq!(catalog.stock_of(&legora_core::ProductId::new("p1")), Some(1));

        let (_, cart) = call(&state, "GET", "/cart", None).await;
        assert_eq!(cart["count"], 0);

        let (status, body) = call(&state, "POST", "/checkout", Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "your cart is empty");
    }

    #[tokio::test]
    async fn test_checkout_backend_down_is_bad_gateway() {
        let catalog = InMemoryCatalog::new();
        catalog.set_offline(true);
        let state = state(catalog);
        call(
            &state,
            "POST",
            "/cart/add",
            Some(json!({ "id": "p1", "title": "Lawn Suit", "price": 2500 })),
        )
        .await;

        let form = json!({
            "full_name": "A", "email": "a@b.pk", "phone": "1",
            "address": "x", "city": "y", "postal_code": "z"
        });
        let (status, _) = call(&state, "POST", "/checkout", Some(form)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(state.session().cart.count(), 1);
    }

    #[tokio::test]
    async fn test_admin_product_validation() {
        let state = state(InMemoryCatalog::new());
        let (status, body) = call(
            &state,
            "POST",
            "/admin/products",
            Some(json!({ "title": "", "price": "100", "stock": "1", "category_id": "c1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title is required");

        let (status, body) = call(
            &state,
            "POST",
            "/admin/products",
            Some(json!({
                "title": "Khussa", "price": "2200", "stock": "", "category_id": "shoes",
                "sizes": [{ "size": "7", "stock": "2" }, { "size": "7", "stock": "1" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["stock"], 3);
    }

    #[tokio::test]
    async fn test_health() {
        let state = state(InMemoryCatalog::new());
        let (status, _) = call(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
