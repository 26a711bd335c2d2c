//! Checkout against the in-memory catalog with a file-backed cart.

#![allow(clippy::unwrap_used)]

use legora_core::{Price, ProductId, ProductSnapshot};
use legora_integration_tests::StateDir;
use legora_storefront::backend::InMemoryCatalog;
use legora_storefront::checkout::{CheckoutError, CheckoutForm, place_order};
use legora_storefront::session::Session;

fn form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Bilal Ahmed".to_string(),
        email: "bilal@example.pk".to_string(),
        phone: "0321-7654321".to_string(),
        address: "House 4, Street 9, F-7".to_string(),
        city: "Islamabad".to_string(),
        postal_code: "44000".to_string(),
        notes: Some("Call before delivery".to_string()),
    }
}

fn product(id: &str, cents: i64, size: Option<&str>) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_cents(cents).unwrap(),
        image: None,
        size: size.map(str::to_owned),
    }
}

#[tokio::test]
async fn test_successful_checkout_clears_persisted_cart() {
    let dir = StateDir::new();
    let catalog = InMemoryCatalog::new()
        .with_stock("kurta", 10)
        .with_size_stock("kurta", "M", 4)
        .with_size_stock("kurta", "L", 6);

    let mut session = Session::open(dir.store());
    session.cart.add_sizes(
        &product("kurta", 320_000, None),
        &[("M".to_string(), 2), ("L".to_string(), 1)],
    );
    session.cart.add_item(product("gift-card", 100_000, None), 1);

    let receipt = place_order(&mut session.cart, &form(), None, &catalog)
        .await
        .unwrap();

    let kurta = ProductId::new("kurta");
    assert_eq!(catalog.stock_of(&kurta), Some(7));
    assert_eq!(catalog.size_stock_of(&kurta, "M"), Some(2));
    assert_eq!(catalog.size_stock_of(&kurta, "L"), Some(5));
    assert_eq!(receipt.stock.skipped, vec![ProductId::new("gift-card")]);
    assert_eq!(receipt.total, Price::from_cents(1_060_000).unwrap());

    let orders = catalog.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.items.len(), 3);
    assert_eq!(orders[0].order.notes.as_deref(), Some("Call before delivery"));

    assert!(Session::open(dir.store()).cart.is_empty());
}

#[tokio::test]
async fn test_failed_checkout_keeps_persisted_cart() {
    let dir = StateDir::new();
    let catalog = InMemoryCatalog::new().with_stock("p1", 1);
    catalog.set_offline(true);

    let mut session = Session::open(dir.store());
    session.cart.add_item(product("p1", 5000, None), 1);

    let err = place_order(&mut session.cart, &form(), None, &catalog)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Backend(_)));

    assert_eq!(Session::open(dir.store()).cart.count(), 1);
}
