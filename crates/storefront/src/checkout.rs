//! Cash-on-delivery checkout.
//!
//! Checkout runs in three steps:
//!
//! 1. validate the customer form (no network, no state change on failure)
//! 2. insert the order row; failure aborts and leaves the cart untouched
//! 3. deduct stock for every line, then clear the cart
//!
//! Once the order row exists the order has been placed. Problems while
//! deducting stock after that point are logged and reported in the
//! [`StockReport`] rather than failing the checkout, so a retry can never
//! insert the same order twice.

use legora_core::{
    CartLine, Email, EmailError, OrderId, OrderStatus, PaymentMethod, Price, PriceError,
    ProductId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::backend::{BackendError, CatalogBackend, NewOrder};
use crate::persistence::KeyValueStore;
use crate::session::CartStore;

/// Errors that stop an order from being placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("order total is invalid: {0}")]
    Total(#[from] PriceError),

    #[error("failed to place order: {0}")]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    fn required(field: &'static str) -> Self {
        Self::Invalid {
            field,
            reason: "is required".to_string(),
        }
    }
}

impl From<EmailError> for CheckoutError {
    fn from(err: EmailError) -> Self {
        Self::Invalid {
            field: "email",
            reason: err.to_string(),
        }
    }
}

/// Customer details as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Customer details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// Trim every field and check that the required ones are present.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<ValidatedCheckout, CheckoutError> {
        let required = |field: &'static str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(CheckoutError::required(field))
            } else {
                Ok(value.to_owned())
            }
        };

        let full_name = required("full_name", &self.full_name)?;
        let email = Email::parse(&required("email", &self.email)?)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;
        let city = required("city", &self.city)?;
        let postal_code = required("postal_code", &self.postal_code)?;
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        Ok(ValidatedCheckout {
            full_name,
            email,
            phone,
            address,
            city,
            postal_code,
            notes,
        })
    }
}

/// What happened to inventory after an order was inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockReport {
    /// Products whose stock was reduced.
    pub deducted: Vec<ProductId>,
    /// Products the data service does not know about.
    pub skipped: Vec<ProductId>,
    /// Products whose stock could not be updated.
    pub failed: Vec<ProductId>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub total: Price,
    pub stock: StockReport,
}

/// Build the order row for `lines`.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for no lines.
pub fn build_order(
    lines: &[CartLine],
    customer: ValidatedCheckout,
    user_id: Option<UserId>,
) -> Result<NewOrder, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let total = lines.iter().fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.line_total()).unwrap_or(Decimal::MAX)
    });

    Ok(NewOrder {
        user_id,
        customer_name: customer.full_name,
        customer_email: customer.email,
        customer_phone: customer.phone,
        shipping_address: customer.address,
        city: customer.city,
        postal_code: customer.postal_code,
        notes: customer.notes,
        payment_method: PaymentMethod::CashOnDelivery,
        status: OrderStatus::Pending,
        total_amount: Price::new(total)?,
        items: lines.to_vec(),
    })
}

/// Reduce remote stock for each line, never below zero.
///
/// Lines whose product is unknown to the data service are skipped. When the
/// product keeps per-size stock and the line has a size with a matching row,
/// that row is reduced as well.
pub async fn deduct_stock<B: CatalogBackend>(lines: &[CartLine], backend: &B) -> StockReport {
    let mut report = StockReport::default();
    for line in lines {
        match deduct_line(line, backend).await {
            Ok(true) => report.deducted.push(line.id.clone()),
            Ok(false) => {
                debug!(product = %line.id, "product not in catalog, stock not deducted");
                report.skipped.push(line.id.clone());
            }
            Err(e) => {
                warn!(product = %line.id, error = %e, "failed to deduct stock");
                report.failed.push(line.id.clone());
            }
        }
    }
    report
}

async fn deduct_line<B: CatalogBackend>(line: &CartLine, backend: &B) -> Result<bool, BackendError> {
    let Some(stock) = backend.product_stock(&line.id).await? else {
        return Ok(false);
    };
    let qty = i64::from(line.qty);
    let sizes = backend.size_stock(&line.id).await?;

    backend
        .set_product_stock(&line.id, stock.saturating_sub(qty).max(0))
        .await?;

    if let Some(size) = line.size.as_deref()
        && let Some(row) = sizes.iter().find(|row| row.size == size)
    {
        backend
            .set_size_stock(&line.id, size, row.stock.saturating_sub(qty).max(0))
            .await?;
    }
    Ok(true)
}

/// Insert an order for `lines` and deduct stock.
///
/// The caller's cart is not touched; see [`place_order`] for the variant
/// that clears it.
///
/// # Errors
///
/// Returns [`CheckoutError`] if the form is invalid, the cart is empty or
/// the order row could not be inserted.
#[instrument(skip_all, fields(lines = lines.len()))]
pub async fn submit_order<B: CatalogBackend>(
    lines: &[CartLine],
    form: &CheckoutForm,
    user_id: Option<UserId>,
    backend: &B,
) -> Result<OrderReceipt, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = form.validate()?;
    let order = build_order(lines, customer, user_id)?;
    let total = order.total_amount;

    let order_id = backend.insert_order(&order).await?;
    let stock = deduct_stock(lines, backend).await;

    info!(
        order_id = %order_id,
        total = %total,
        skipped = stock.skipped.len(),
        failed = stock.failed.len(),
        "order placed"
    );
    Ok(OrderReceipt {
        order_id,
        total,
        stock,
    })
}

/// Place an order for everything in `cart`, clearing it on success.
///
/// # Errors
///
/// See [`submit_order`]. The cart is left intact on error.
pub async fn place_order<S, B>(
    cart: &mut CartStore<S>,
    form: &CheckoutForm,
    user_id: Option<UserId>,
    backend: &B,
) -> Result<OrderReceipt, CheckoutError>
where
    S: KeyValueStore,
    B: CatalogBackend,
{
    let lines = cart.lines().to_vec();
    let receipt = submit_order(&lines, form, user_id, backend).await?;
    cart.clear();
    Ok(receipt)
}
