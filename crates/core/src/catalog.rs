//! Validation of admin catalog input.
//!
//! The admin product and category forms collect free text. Everything here
//! runs before any request to the hosted data service, so a bad form never
//! produces a partial write.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price};

/// Reasons a product form is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("title is required")]
    MissingTitle,
    #[error("choose a category")]
    MissingCategory,
    #[error("price must be a non-negative number")]
    InvalidPrice,
    #[error("stock must be a non-negative whole number")]
    InvalidStock,
    #[error("every size needs a label")]
    BlankSize,
    #[error("size {0:?} has invalid stock")]
    InvalidSizeStock(String),
}

/// Stock held for one size of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    pub stock: u32,
}

/// Raw size row as typed into the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SizeInput {
    pub size: String,
    pub stock: String,
}

/// Raw product form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: String,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sizes: Vec<SizeInput>,
}

/// A product form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub title: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub category_id: CategoryId,
    pub sizes: Vec<SizeStock>,
}

impl ProductForm {
    /// Validate the form.
    ///
    /// Sizes with the same trimmed label are merged by summing their stock,
    /// keeping the position of the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductInputError`] encountered.
    pub fn validate(&self) -> Result<ProductDraft, ProductInputError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ProductInputError::MissingTitle);
        }
        let category_id = self
            .category_id
            .clone()
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or(ProductInputError::MissingCategory)?;

        let price = Decimal::from_str(self.price.trim())
            .ok()
            .and_then(|amount| Price::new(amount).ok())
            .ok_or(ProductInputError::InvalidPrice)?;

        let stock = parse_stock(&self.stock).ok_or(ProductInputError::InvalidStock)?;

        let mut sizes: Vec<SizeStock> = Vec::with_capacity(self.sizes.len());
        for input in &self.sizes {
            let label = input.size.trim();
            if label.is_empty() {
                return Err(ProductInputError::BlankSize);
            }
            let stock = parse_stock(&input.stock)
                .ok_or_else(|| ProductInputError::InvalidSizeStock(label.to_owned()))?;
            match sizes.iter_mut().find(|s| s.size == label) {
                Some(existing) => existing.stock = existing.stock.saturating_add(stock),
                None => sizes.push(SizeStock {
                    size: label.to_owned(),
                    stock,
                }),
            }
        }

        Ok(ProductDraft {
            title: title.to_owned(),
            description: non_blank(self.description.as_deref()),
            price,
            stock,
            category_id,
            sizes,
        })
    }
}

impl ProductDraft {
    /// Total stock across sizes, or the flat stock when the product is unsized.
    #[must_use]
    pub fn total_stock(&self) -> u32 {
        if self.sizes.is_empty() {
            self.stock
        } else {
            self.sizes
                .iter()
                .fold(0u32, |acc, s| acc.saturating_add(s.stock))
        }
    }
}

/// Reasons a category form is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CategoryInputError {
    #[error("category name is required")]
    MissingName,
    #[error("category name {0:?} does not produce a usable slug")]
    EmptySlug(String),
}

/// Raw category form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A category form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryForm {
    /// Validate the form and derive the category slug from its name.
    ///
    /// # Errors
    ///
    /// Returns a [`CategoryInputError`] if the name is blank or has no
    /// alphanumeric characters.
    pub fn validate(&self) -> Result<CategoryDraft, CategoryInputError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryInputError::MissingName);
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(CategoryInputError::EmptySlug(name.to_owned()));
        }
        Ok(CategoryDraft {
            name: name.to_owned(),
            slug,
            description: non_blank(self.description.as_deref()),
            image_url: non_blank(self.image_url.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Empty stock fields count as zero.
fn parse_stock(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    raw.parse::<u32>().ok()
}

/// Derive a URL slug from a category name.
///
/// ```
/// use legora_core::catalog::slugify;
///
/// assert_eq!(slugify("  Men's Summer Wear "), "men-s-summer-wear");
/// assert_eq!(slugify("Shoes & Bags"), "shoes-bags");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            title: " Kurta ".to_string(),
            description: Some("   ".to_string()),
            price: "1499.50".to_string(),
            stock: "10".to_string(),
            category_id: Some(CategoryId::new("c1")),
            sizes: Vec::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.title, "Kurta");
        assert_eq!(draft.description, None);
        assert_eq!(draft.price, Price::from_cents(149_950).unwrap());
        assert_eq!(draft.total_stock(), 10);
    }

    #[test]
    fn test_rejects_blank_title() {
        let mut f = form();
        f.title = "  ".to_string();
        assert_eq!(f.validate(), Err(ProductInputError::MissingTitle));
    }

    #[test]
    fn test_requires_category() {
        let mut f = form();
        f.category_id = None;
        assert_eq!(f.validate(), Err(ProductInputError::MissingCategory));
    }

    #[test]
    fn test_rejects_non_numeric_and_negative_price() {
        let mut f = form();
        f.price = "12abc".to_string();
        assert_eq!(f.validate(), Err(ProductInputError::InvalidPrice));
        f.price = "-1".to_string();
        assert_eq!(f.validate(), Err(ProductInputError::InvalidPrice));
    }

    #[test]
    fn test_rejects_bad_stock() {
        let mut f = form();
        f.stock = "-3".to_string();
        assert_eq!(f.validate(), Err(ProductInputError::InvalidStock));
        f.stock = "2.5".to_string();
        assert_eq!(f.validate(), Err(ProductInputError::InvalidStock));
    }

    #[test]
    fn test_merges_duplicate_sizes() {
        let mut f = form();
        f.sizes = vec![
            SizeInput { size: "M".into(), stock: "2".into() },
            SizeInput { size: "L".into(), stock: "1".into() },
            SizeInput { size: " M ".into(), stock: "3".into() },
        ];
        let draft = f.validate().unwrap();
        assert_eq!(
            draft.sizes,
            vec![
                SizeStock { size: "M".into(), stock: 5 },
                SizeStock { size: "L".into(), stock: 1 },
            ]
        );
        assert_eq!(draft.total_stock(), 6);
    }

    #[test]
    fn test_rejects_blank_size_label() {
        let mut f = form();
        f.sizes = vec![SizeInput { size: " ".into(), stock: "1".into() }];
        assert_eq!(f.validate(), Err(ProductInputError::BlankSize));
    }

    #[test]
    fn test_category_form() {
        let draft = CategoryForm {
            name: " Winter Shawls ".to_string(),
            description: Some(String::new()),
            image_url: None,
        }
        .validate()
        .unwrap();
        assert_eq!(draft.name, "Winter Shawls");
        assert_eq!(draft.slug, "winter-shawls");
        assert_eq!(draft.description, None);

        let blank = CategoryForm::default().validate();
        assert_eq!(blank, Err(CategoryInputError::MissingName));

        let symbols = CategoryForm {
            name: "***".to_string(),
            ..CategoryForm::default()
        };
        assert!(matches!(symbols.validate(), Err(CategoryInputError::EmptySlug(_))));
    }

    #[test]
    fn test_slugify_edges() {
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("New Arrivals 2024"), "new-arrivals-2024");
    }
}
