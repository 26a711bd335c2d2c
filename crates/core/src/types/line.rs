//! Cart lines, wishlist items and their identity.
//!
//! Both collections identify an entry by `(product id, optional size)`.
//! The serialized field names are the persisted snapshot format and must
//! not change without a new storage key.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Identity of a cart line or wishlist item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl LineKey {
    #[must_use]
    pub fn new(id: impl Into<ProductId>, size: Option<String>) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// Target of a remove/adjust operation.
///
/// A selector without a size matches every size-variant of the product;
/// with a size it matches exactly one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSelector {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl LineSelector {
    /// Select every variant of a product.
    #[must_use]
    pub fn product(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            size: None,
        }
    }

    /// Select one size-variant of a product.
    #[must_use]
    pub fn variant(id: impl Into<ProductId>, size: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: Some(size.into()),
        }
    }

    /// Whether `key` is matched by this selector.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.id == key.id && (self.size.is_none() || self.size == key.size)
    }
}

impl From<LineKey> for LineSelector {
    fn from(key: LineKey) -> Self {
        Self {
            id: key.id,
            size: key.size,
        }
    }
}

/// Product display data captured when something is added to the cart or
/// wishlist. A cart line is this plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ProductSnapshot {
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            size: self.size.clone(),
        }
    }

    /// Same product, different size-variant.
    #[must_use]
    pub fn with_size(&self, size: Option<String>) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

/// One line of the shopping cart. `qty` is always at least 1 while the line
/// is held by a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn new(product: ProductSnapshot, qty: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            qty,
            size: product.size,
        }
    }

    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            size: self.size.clone(),
        }
    }

    /// Whether this line has the identity `(id, size)`.
    #[must_use]
    pub fn is(&self, key: &LineKey) -> bool {
        self.id == key.id && self.size == key.size
    }

    /// `qty * price`.
    #[must_use]
    pub fn line_total(&self) -> rust_decimal::Decimal {
        self.price.line_total(self.qty)
    }
}

/// A saved-for-later product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl WishlistItem {
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            size: self.size.clone(),
        }
    }

    #[must_use]
    pub fn is(&self, key: &LineKey) -> bool {
        self.id == key.id && self.size == key.size
    }
}

impl From<ProductSnapshot> for WishlistItem {
    fn from(product: ProductSnapshot) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            size: product.size,
        }
    }
}

impl From<WishlistItem> for ProductSnapshot {
    fn from(item: WishlistItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            price: item.price,
            image: item.image,
            size: item.size,
        }
    }
}
