//! Checkout command.

use legora_storefront::checkout::{CheckoutForm, place_order};

use super::{CommandError, Context};

/// Place an order for the stored cart.
///
/// # Errors
///
/// Returns [`CommandError::NoBackend`] without touching the cart when no
/// data service is configured, and [`CommandError::Checkout`] if the form is
/// invalid, the cart is empty or the order could not be stored. The cart is
/// kept on error.
pub async fn place(ctx: &Context, form: &CheckoutForm) -> Result<(), CommandError> {
    let backend = ctx.backend()?;
    let mut session = ctx.session();

    let receipt = place_order(&mut session.cart, form, None, &backend).await?;

    tracing::info!(
        "Order {} placed, {} due on delivery",
        receipt.order_id,
        receipt.total
    );
    if !receipt.stock.skipped.is_empty() {
        tracing::info!(
            "Stock not tracked for {} product(s)",
            receipt.stock.skipped.len()
        );
    }
    if !receipt.stock.failed.is_empty() {
        tracing::warn!(
            "Stock could not be updated for {} product(s); adjust it in the data service",
            receipt.stock.failed.len()
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use legora_core::{Price, ProductId, ProductSnapshot};
    use legora_storefront::config::StorefrontConfig;

    struct TempDir(PathBuf);

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Ayesha Khan".to_string(),
            email: "ayesha@example.com".to_string(),
            phone: "0300-1234567".to_string(),
            address: "12 Mall Road".to_string(),
            city: "Lahore".to_string(),
            postal_code: "54000".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_without_backend_keeps_cart() {
        let dir = TempDir(std::env::temp_dir().join(format!(
            "legora-cli-checkout-{}",
            std::process::id()
        )));
        let ctx = Context::from_config(StorefrontConfig {
            state_dir: dir.0.clone(),
            backend: None,
            ..StorefrontConfig::default()
        });
        ctx.session().cart.add_item(
            ProductSnapshot {
                id: ProductId::new("p1"),
                title: "Lawn Suit".to_string(),
                price: Price::from_cents(250_000).unwrap(),
                image: None,
                size: None,
            },
            2,
        );

        let result = place(&ctx, &form()).await;

        assert!(matches!(result, Err(CommandError::NoBackend)));
        let cart = ctx.session().cart;
        assert_eq!(cart.count(), 2);
        assert!(dir.0.join("app_cart_v1.json").exists());
    }
}
