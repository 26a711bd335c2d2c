//! PostgREST-style HTTP client for the hosted data service.
//!
//! Tables are addressed as `<base>/<table>` with `column=eq.value` filters.
//! Every request carries the service key both as `apikey` and as a bearer
//! token.

use std::sync::Arc;

use legora_core::catalog::{CategoryDraft, ProductDraft};
use legora_core::{CategoryId, OrderId, ProductId};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{BackendError, CatalogBackend, NewOrder, SizeRow};
use crate::config::BackendConfig;

/// Longest response body kept in a [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Client for the data service's REST interface.
#[derive(Clone)]
pub struct RestCatalog {
    inner: Arc<RestCatalogInner>,
}

struct RestCatalogInner {
    client: reqwest::Client,
    base: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for RestCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestCatalog")
            .field("base", &self.inner.base.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct StockRow {
    #[serde(default)]
    stock: Option<i64>,
}

impl RestCatalog {
    /// Create a client for the service described by `config`.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(RestCatalogInner {
                client: reqwest::Client::new(),
                base: config.url.clone(),
                api_key: config.key.clone(),
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Build `<base>/<table>?<filters>`.
    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Result<Url, BackendError> {
        let mut url = self.inner.base.join(table)?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (column, value) in filters {
                pairs.append_pair(column, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Content-Type", "application/json")
    }

    /// Send a request and return the response body, failing on non-2xx.
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response: Response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "data service returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(body)
    }

    /// Insert one row and return its `id` column.
    async fn insert_returning_id(&self, table: &str, row: &Value) -> Result<String, BackendError> {
        let url = self.table_url(table, &[("select", "id".to_string())])?;
        let body = self
            .send(
                self.request(Method::POST, url)
                    .header("Prefer", "return=representation")
                    .json(row),
            )
            .await?;

        let rows: Vec<Value> = serde_json::from_str(&body)?;
        rows.first()
            .and_then(|row| row.get("id"))
            .and_then(id_to_string)
            .ok_or_else(|| BackendError::UnexpectedResponse(format!("{table} insert returned no id")))
    }

    async fn patch_stock(&self, table: &str, filters: &[(&str, String)], stock: i64) -> Result<(), BackendError> {
        let url = self.table_url(table, filters)?;
        self.send(self.request(Method::PATCH, url).json(&json!({ "stock": stock })))
            .await?;
        Ok(())
    }
}

/// Row ids come back as numbers or strings depending on the column type.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

impl CatalogBackend for RestCatalog {
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let row = serde_json::to_value(order)?;
        let id = self.insert_returning_id("orders", &row).await?;
        debug!(order_id = %id, "order inserted");
        Ok(OrderId::new(id))
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn product_stock(&self, id: &ProductId) -> Result<Option<i64>, BackendError> {
        let url = self.table_url(
            "products",
            &[("id", eq(id.as_str())), ("select", "id,stock".to_string())],
        )?;
        let body = self.send(self.request(Method::GET, url)).await?;
        let rows: Vec<StockRow> = serde_json::from_str(&body)?;
        Ok(rows.first().map(|row| row.stock.unwrap_or(0)))
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn size_stock(&self, id: &ProductId) -> Result<Vec<SizeRow>, BackendError> {
        let url = self.table_url(
            "product_sizes",
            &[
                ("product_id", eq(id.as_str())),
                ("select", "size,stock".to_string()),
            ],
        )?;
        let body = self.send(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn set_product_stock(&self, id: &ProductId, stock: i64) -> Result<(), BackendError> {
        self.patch_stock("products", &[("id", eq(id.as_str()))], stock)
            .await
    }

    #[instrument(skip(self), fields(product = %id))]
    async fn set_size_stock(
        &self,
        id: &ProductId,
        size: &str,
        stock: i64,
    ) -> Result<(), BackendError> {
        self.patch_stock(
            "product_sizes",
            &[("product_id", eq(id.as_str())), ("size", eq(size))],
            stock,
        )
        .await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError> {
        let row = json!({
            "category_id": draft.category_id,
            "name": draft.title,
            "description": draft.description,
            "stock": draft.total_stock(),
            "price": draft.price,
        });
        let id = ProductId::new(self.insert_returning_id("products", &row).await?);

        if draft.sizes.is_empty() {
            return Ok(id);
        }

        let rows: Vec<Value> = draft
            .sizes
            .iter()
            .map(|s| json!({ "product_id": id, "size": s.size, "stock": s.stock }))
            .collect();
        let url = self.table_url("product_sizes", &[])?;
        if let Err(e) = self.send(self.request(Method::POST, url).json(&rows)).await {
            // Leave no product behind without its sizes.
            let url = self.table_url("products", &[("id", eq(id.as_str()))])?;
            if let Err(cleanup) = self.send(self.request(Method::DELETE, url)).await {
                warn!(product = %id, error = %cleanup, "failed to remove product after size insert failed");
            }
            return Err(e);
        }
        Ok(id)
    }

    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    async fn create_category(&self, draft: &CategoryDraft) -> Result<CategoryId, BackendError> {
        let row = serde_json::to_value(draft)?;
        let id = self.insert_returning_id("categories", &row).await?;
        Ok(CategoryId::new(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> RestCatalog {
        RestCatalog::new(&BackendConfig {
            url: Url::parse("https://data.example.com/rest/v1/").unwrap(),
            key: SecretString::from("service-key"),
        })
    }

    #[test]
    fn test_table_url_with_filters() {
        let url = catalog()
            .table_url(
                "product_sizes",
                &[("product_id", eq("42")), ("size", eq("X L"))],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://data.example.com/rest/v1/product_sizes?product_id=eq.42&size=eq.X+L"
        );
    }

    #[test]
    fn test_table_url_without_filters() {
        let url = catalog().table_url("orders", &[]).unwrap();
        assert_eq!(url.as_str(), "https://data.example.com/rest/v1/orders");
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!(17)), Some("17".to_string()));
        assert_eq!(id_to_string(&json!("a-b")), Some("a-b".to_string()));
        assert_eq!(id_to_string(&json!(null)), None);
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", catalog());
        assert!(!debug.contains("service-key"));
        assert!(debug.contains("data.example.com"));
    }

    mod against_service {
        use std::sync::{Arc, Mutex};

        use axum::Router;
        use axum::extract::State;
        use axum::http::{HeaderMap, StatusCode, Uri};
        use legora_core::catalog::{CategoryForm, ProductForm, SizeInput};
        use legora_core::{CartLine, Email, OrderStatus, PaymentMethod, Price, ProductSnapshot};

        use super::*;

        /// One request as the data service saw it.
        #[derive(Debug, Clone)]
        struct Seen {
            method: String,
            target: String,
            api_key: Option<String>,
            body: String,
        }

        type Log = Arc<Mutex<Vec<Seen>>>;

        /// Answers like a PostgREST service whose `product_sizes` table
        /// rejects inserts.
        async fn data_service(
            State(log): State<Log>,
            method: Method,
            headers: HeaderMap,
            uri: Uri,
            body: String,
        ) -> (StatusCode, String) {
            let target = uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string);
            log.lock().unwrap().push(Seen {
                method: method.to_string(),
                target,
                api_key: headers
                    .get("apikey")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body,
            });

            let table = uri.path().trim_start_matches("/rest/v1/");
            let query = uri.query().unwrap_or_default();
            let (status, body) = match (method.as_str(), table) {
                ("POST", "orders") => (StatusCode::CREATED, r#"[{"id":"ord-1"}]"#),
                ("POST", "products") => (StatusCode::CREATED, r#"[{"id":42}]"#),
                ("POST", "categories") => (StatusCode::CREATED, "[]"),
                ("POST", "product_sizes") => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "sizes table is read-only")
                }
                ("GET", "products") if query.contains("id=eq.known") => {
                    (StatusCode::OK, r#"[{"id":"known","stock":5}]"#)
                }
                ("GET", "products") => (StatusCode::OK, "[]"),
                ("PATCH" | "DELETE", _) => (StatusCode::NO_CONTENT, ""),
                _ => (StatusCode::NOT_FOUND, ""),
            };
            (status, body.to_string())
        }

        async fn start() -> (RestCatalog, Log) {
            let log = Log::default();
            let app = Router::new()
                .fallback(data_service)
                .with_state(log.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let catalog = RestCatalog::new(&BackendConfig {
                url: Url::parse(&format!("http://{addr}/rest/v1/")).unwrap(),
                key: SecretString::from("service-key"),
            });
            (catalog, log)
        }

        fn seen(log: &Log) -> Vec<Seen> {
            log.lock().unwrap().clone()
        }

        fn order() -> NewOrder {
            let product = ProductSnapshot {
                id: ProductId::new("known"),
                title: "Lawn Suit".to_string(),
                price: Price::from_cents(250_000).unwrap(),
                image: None,
                size: None,
            };
            NewOrder {
                user_id: None,
                customer_name: "Ayesha Khan".to_string(),
                customer_email: Email::parse("ayesha@example.com").unwrap(),
                customer_phone: "0300-1234567".to_string(),
                shipping_address: "12 Mall Road".to_string(),
                city: "Lahore".to_string(),
                postal_code: "54000".to_string(),
                notes: None,
                payment_method: PaymentMethod::CashOnDelivery,
                status: OrderStatus::Pending,
                total_amount: Price::from_cents(250_000).unwrap(),
                items: vec![CartLine::new(product, 1)],
            }
        }

        #[tokio::test]
        async fn test_insert_order_returns_row_id() {
            let (catalog, log) = start().await;

            let id = catalog.insert_order(&order()).await.unwrap();

            assert_eq!(id, OrderId::new("ord-1"));
            let requests = seen(&log);
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, "POST");
            assert_eq!(requests[0].target, "/rest/v1/orders?select=id");
            assert_eq!(requests[0].api_key.as_deref(), Some("service-key"));
            assert!(requests[0].body.contains("\"payment_method\":\"Cash on Delivery\""));
        }

        #[tokio::test]
        async fn test_product_stock_known_and_unknown() {
            let (catalog, _log) = start().await;

            assert_eq!(
                catalog.product_stock(&ProductId::new("known")).await.unwrap(),
                Some(5)
            );
            assert_eq!(
                catalog.product_stock(&ProductId::new("gone")).await.unwrap(),
                None
            );
        }

        #[tokio::test]
        async fn test_set_size_stock_filters_by_product_and_size() {
            let (catalog, log) = start().await;

            catalog
                .set_size_stock(&ProductId::new("known"), "M", 3)
                .await
                .unwrap();

            let requests = seen(&log);
            assert_eq!(requests[0].method, "PATCH");
            assert_eq!(
                requests[0].target,
                "/rest/v1/product_sizes?product_id=eq.known&size=eq.M"
            );
            assert_eq!(requests[0].body, r#"{"stock":3}"#);
        }

        #[tokio::test]
        async fn test_non_success_status_is_reported() {
            let (catalog, _log) = start().await;

            let err = catalog
                .size_stock(&ProductId::new("known"))
                .await
                .unwrap_err();

            assert!(matches!(err, BackendError::Status { status: 404, .. }));
        }

        #[tokio::test]
        async fn test_insert_without_id_is_unexpected() {
            let (catalog, _log) = start().await;
            let draft = CategoryForm {
                name: "Shoes".to_string(),
                ..CategoryForm::default()
            }
            .validate()
            .unwrap();

            let err = catalog.create_category(&draft).await.unwrap_err();

            assert!(matches!(err, BackendError::UnexpectedResponse(_)));
        }

        #[tokio::test]
        async fn test_failed_size_insert_removes_product() {
            let (catalog, log) = start().await;
            let draft = ProductForm {
                title: "Khussa".to_string(),
                price: "2200".to_string(),
                category_id: Some(CategoryId::new("shoes")),
                sizes: vec![SizeInput {
                    size: "7".into(),
                    stock: "2".into(),
                }],
                ..ProductForm::default()
            }
            .validate()
            .unwrap();

            let err = catalog.create_product(&draft).await.unwrap_err();

            assert!(matches!(
                err,
                BackendError::Status { status: 500, ref body } if body == "sizes table is read-only"
            ));
            let requests: Vec<(String, String)> = seen(&log)
                .into_iter()
                .map(|r| (r.method, r.target))
                .collect();
            assert_eq!(
                requests,
                vec![
                    ("POST".to_string(), "/rest/v1/products?select=id".to_string()),
                    ("POST".to_string(), "/rest/v1/product_sizes".to_string()),
                    ("DELETE".to_string(), "/rest/v1/products?id=eq.42".to_string()),
                ]
            );
        }
    }
}
