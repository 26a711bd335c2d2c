//! In-memory data service.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use legora_core::catalog::{CategoryDraft, ProductDraft};
use legora_core::{CategoryId, OrderId, ProductId};

use super::{BackendError, CatalogBackend, NewOrder, SizeRow};

/// An order as recorded by [`InMemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    pub id: OrderId,
    pub order: NewOrder,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    stock: BTreeMap<ProductId, i64>,
    sizes: BTreeMap<ProductId, Vec<SizeRow>>,
    products: BTreeMap<ProductId, ProductDraft>,
    categories: BTreeMap<CategoryId, CategoryDraft>,
    orders: Vec<StoredOrder>,
    offline: bool,
}

/// Process-local tables standing in for the hosted data service.
///
/// Clones share the same tables. [`InMemoryCatalog::set_offline`] makes every
/// call fail, for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product's flat stock.
    #[must_use]
    pub fn with_stock(self, id: impl Into<ProductId>, stock: i64) -> Self {
        if let Ok(mut tables) = self.tables.lock() {
            tables.stock.insert(id.into(), stock);
        }
        self
    }

    /// Seed the stock of one size of a product.
    #[must_use]
    pub fn with_size_stock(self, id: impl Into<ProductId>, size: &str, stock: i64) -> Self {
        if let Ok(mut tables) = self.tables.lock() {
            let rows = tables.sizes.entry(id.into()).or_default();
            match rows.iter_mut().find(|row| row.size == size) {
                Some(row) => row.stock = stock,
                None => rows.push(SizeRow {
                    size: size.to_owned(),
                    stock,
                }),
            }
        }
        self
    }

    /// Toggle whether calls succeed.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.offline = offline;
        }
    }

    /// Orders recorded so far, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<StoredOrder> {
        self.tables
            .lock()
            .map(|tables| tables.orders.clone())
            .unwrap_or_default()
    }

    /// Current flat stock of a product.
    #[must_use]
    pub fn stock_of(&self, id: &ProductId) -> Option<i64> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.stock.get(id).copied())
    }

    /// Current stock of one size of a product.
    #[must_use]
    pub fn size_stock_of(&self, id: &ProductId, size: &str) -> Option<i64> {
        self.tables.lock().ok().and_then(|tables| {
            tables
                .sizes
                .get(id)
                .and_then(|rows| rows.iter().find(|row| row.size == size))
                .map(|row| row.stock)
        })
    }

    /// A product created through [`CatalogBackend::create_product`].
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<ProductDraft> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.products.get(id).cloned())
    }

    /// A category created through [`CatalogBackend::create_category`].
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<CategoryDraft> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.categories.get(id).cloned())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, BackendError> {
        let tables = self
            .tables
            .lock()
            .map_err(|_| BackendError::Unavailable("catalog lock poisoned".to_string()))?;
        if tables.offline {
            return Err(BackendError::Unavailable("in-memory catalog is offline".to_string()));
        }
        Ok(tables)
    }
}

impl CatalogBackend for InMemoryCatalog {
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let mut tables = self.tables()?;
        let id = OrderId::new(uuid::Uuid::new_v4().to_string());
        tables.orders.push(StoredOrder {
            id: id.clone(),
            order: order.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn product_stock(&self, id: &ProductId) -> Result<Option<i64>, BackendError> {
        Ok(self.tables()?.stock.get(id).copied())
    }

    async fn size_stock(&self, id: &ProductId) -> Result<Vec<SizeRow>, BackendError> {
        Ok(self.tables()?.sizes.get(id).cloned().unwrap_or_default())
    }

    async fn set_product_stock(&self, id: &ProductId, stock: i64) -> Result<(), BackendError> {
        let mut tables = self.tables()?;
        if let Some(current) = tables.stock.get_mut(id) {
            *current = stock;
        }
        Ok(())
    }

    async fn set_size_stock(
        &self,
        id: &ProductId,
        size: &str,
        stock: i64,
    ) -> Result<(), BackendError> {
        let mut tables = self.tables()?;
        if let Some(row) = tables
            .sizes
            .get_mut(id)
            .and_then(|rows| rows.iter_mut().find(|row| row.size == size))
        {
            row.stock = stock;
        }
        Ok(())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<ProductId, BackendError> {
        let mut tables = self.tables()?;
        let id = ProductId::new(uuid::Uuid::new_v4().to_string());
        tables
            .stock
            .insert(id.clone(), i64::from(draft.total_stock()));
        if !draft.sizes.is_empty() {
            let rows = draft
                .sizes
                .iter()
                .map(|s| SizeRow {
                    size: s.size.clone(),
                    stock: i64::from(s.stock),
                })
                .collect();
            tables.sizes.insert(id.clone(), rows);
        }
        tables.products.insert(id.clone(), draft.clone());
        Ok(id)
    }

    async fn create_category(&self, draft: &CategoryDraft) -> Result<CategoryId, BackendError> {
        let mut tables = self.tables()?;
        if tables.categories.values().any(|c| c.slug == draft.slug) {
            return Err(BackendError::Status {
                status: 409,
                body: format!("category slug {:?} already exists", draft.slug),
            });
        }
        let id = CategoryId::new(draft.slug.clone());
        tables.categories.insert(id.clone(), draft.clone());
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use legora_core::catalog::{CategoryForm, ProductForm, SizeInput};

    #[tokio::test]
    async fn test_seeded_stock() {
        let catalog = InMemoryCatalog::new()
            .with_stock("p1", 7)
            .with_size_stock("p1", "M", 3);

        let p1 = ProductId::new("p1");
        assert_eq!(catalog.product_stock(&p1).await.unwrap(), Some(7));
        assert_eq!(catalog.product_stock(&ProductId::new("zz")).await.unwrap(), None);
        assert_eq!(catalog.size_stock(&p1).await.unwrap().len(), 1);

        catalog.set_size_stock(&p1, "M", 1).await.unwrap();
        assert_eq!(catalog.size_stock_of(&p1, "M"), Some(1));
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let catalog = InMemoryCatalog::new().with_stock("p1", 1);
        catalog.set_offline(true);
        let err = catalog.product_stock(&ProductId::new("p1")).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_create_product_records_size_rows() {
        let catalog = InMemoryCatalog::new();
        let draft = ProductForm {
            title: "Khussa".to_string(),
            price: "2200".to_string(),
            category_id: Some(CategoryId::new("shoes")),
            sizes: vec![
                SizeInput { size: "7".into(), stock: "2".into() },
                SizeInput { size: "8".into(), stock: "4".into() },
            ],
            ..ProductForm::default()
        }
        .validate()
        .unwrap();

        let id = catalog.create_product(&draft).await.unwrap();
        assert_eq!(catalog.stock_of(&id), Some(6));
        assert_eq!(catalog.size_stock_of(&id, "8"), Some(4));
        assert_eq!(catalog.product(&id).unwrap().title, "Khussa");
    }

    #[tokio::test]
    async fn test_duplicate_category_slug_conflicts() {
        let catalog = InMemoryCatalog::new();
        let draft = CategoryForm {
            name: "Bridal Wear".to_string(),
            ..CategoryForm::default()
        }
        .validate()
        .unwrap();

        let id = catalog.create_category(&draft).await.unwrap();
        assert_eq!(id.as_str(), "bridal-wear");
        assert!(catalog.category(&id).is_some());
        assert!(matches!(
            catalog.create_category(&draft).await,
            Err(BackendError::Status { status: 409, .. })
        ));
    }
}
