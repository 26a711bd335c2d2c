//! Port to the hosted relational data service.
//!
//! # Architecture
//!
//! - The data service is the source of truth for products, per-size stock,
//!   categories and orders. Nothing here caches or syncs it.
//! - [`CatalogBackend`] is the narrow set of calls checkout and the admin
//!   forms make. Every call can fail; callers handle failures where they
//!   make the call. There is no retry layer.
//!
//! # Implementations
//!
//! - [`InMemoryCatalog`] - process-local tables for tests and local runs
//! - [`RestCatalog`] - PostgREST-style HTTP API via `reqwest`
//! - [`Backend`] - runtime choice between the two, selected from config

mod memory;
mod rest;

use std::future::Future;

use legora_core::catalog::{CategoryDraft, ProductDraft};
use legora_core::{CartLine, CategoryId, Email, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{InMemoryCatalog, StoredOrder};
pub use rest::RestCatalog;

/// Errors that can occur when calling the data service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("data service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// The service is not reachable.
    #[error("data service unavailable: {0}")]
    Unavailable(String),

    /// The response parsed but did not contain what was asked for.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Order row as written at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping_address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub total_amount: Price,
    pub items: Vec<CartLine>,
}

/// Stock of one size of a product. A null stock column reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRow {
    pub size: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub stock: i64,
}

fn null_as_zero<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Calls made against the data service.
///
/// Methods return `Send` futures so they can be awaited from `axum`
/// handlers.
pub trait CatalogBackend: Send + Sync {
    /// Insert an order and return its id.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, BackendError>> + Send;

    /// Flat stock of a product, or `None` if the service has no such product.
    fn product_stock(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<i64>, BackendError>> + Send;

    /// Per-size stock rows of a product. Empty for unsized products.
    fn size_stock(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Vec<SizeRow>, BackendError>> + Send;

    /// Overwrite a product's flat stock.
    fn set_product_stock(
        &self,
        id: &ProductId,
        stock: i64,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Overwrite the stock of one size of a product.
    fn set_size_stock(
        &self,
        id: &ProductId,
        size: &str,
        stock: i64,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Create a product and its size rows.
    fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<ProductId, BackendError>> + Send;

    /// Create a category.
    fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> impl Future<Output = Result<CategoryId, BackendError>> + Send;
}

/// The data service implementation chosen at start-up.
#[derive(Debug, Clone)]
pub enum Backend {
    Memory(InMemoryCatalog),
    Rest(RestCatalog),
}

impl CatalogBackend for Backend {
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        match self {
            Self::Memory(b) => b.insert_order(order).await,
            Self::Rest(b) => b.insert_order(order).await,
        }
    }

    async fn product_stock(&self, id: &ProductId) -> Result<Option<i64>, BackendError> {
        match self {
            Self::Memory(b) => b.product_stock(id).await,
            Self::Rest(b) => b.product_stock(id).await,
        }
    }

    async fn size_stock(&self, id: &ProductId) -> Result<Vec<SizeRow>, BackendError> {
        match self {
            Self::Memory(b) => b.size_stock(id).await,
            Self::Rest(b) => b.size_stock(id).await,
        }
    }

    async fn set_product_stock(&self, id: &ProductId, stock: i64) -> Result<(), BackendError> {
        match self {
            Self::Memory(b) => b.set_product_stock(id, stock).await,
            Self::Rest(b) => b.set_product_stock(id, stock).await,
        }
    }

    async fn set_size_stock(
        &self,
        id: &ProductId,
        size: &str,
        stock: i64,
    ) -> Result<(), BackendError> {
        match self {
            Self::Memory(b) => b.set_size_stock(id, size, stock).await,
            Self::Rest(b) => b.set_size_stock(id, size, stock).await,
        }
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError> {
        match self {
            Self::Memory(b) => b.create_product(draft).await,
            Self::Rest(b) => b.create_product(draft).await,
        }
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<CategoryId, BackendError> {
        match self {
            Self::Memory(b) => b.create_category(draft).await,
            Self::Rest(b) => b.create_category(draft).await,
        }
    }
}
