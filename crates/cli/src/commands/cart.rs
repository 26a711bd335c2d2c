//! Cart commands.

use legora_core::{LineSelector, Price, ProductSnapshot};
use legora_storefront::persistence::KeyValueStore;
use legora_storefront::session::CartStore;

use super::Context;

/// Parse `SIZE=QTY`.
pub fn parse_size_qty(raw: &str) -> Result<(String, u32), String> {
    let (size, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SIZE=QTY, got `{raw}`"))?;
    let size = size.trim();
    if size.is_empty() {
        return Err("size must not be empty".to_string());
    }
    let qty = qty
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid quantity for size {size}: {e}"))?;
    Ok((size.to_owned(), qty))
}

fn report<S: KeyValueStore>(cart: &CartStore<S>) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }
    for line in cart.lines() {
        tracing::info!(
            "  {} x {}{} @ {} = {:.2}",
            line.qty,
            line.title,
            line.size
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default(),
            line.price,
            line.line_total()
        );
    }
    let total = Price::new(cart.total()).unwrap_or(Price::ZERO);
    tracing::info!("{} item(s), total {}", cart.count(), total);
}

pub fn show(ctx: &Context) {
    report(&ctx.session().cart);
}

/// Add `qty` of `product`, or the listed sizes when `sizes` is non-empty.
pub fn add(ctx: &Context, product: &ProductSnapshot, qty: u32, sizes: &[(String, u32)]) {
    let mut session = ctx.session();
    let added = if sizes.is_empty() {
        session.cart.add_item(product.clone(), qty);
        u64::from(qty)
    } else {
        session.cart.add_sizes(product, sizes)
    };
    tracing::info!("Added {added} x {}", product.title);
    report(&session.cart);
}

pub fn remove(ctx: &Context, selector: &LineSelector) {
    let mut session = ctx.session();
    session.cart.remove_item(selector);
    report(&session.cart);
}

pub fn increment(ctx: &Context, selector: &LineSelector) {
    let mut session = ctx.session();
    session.cart.increment(selector);
    report(&session.cart);
}

pub fn decrement(ctx: &Context, selector: &LineSelector) {
    let mut session = ctx.session();
    session.cart.decrement(selector);
    report(&session.cart);
}

pub fn clear(ctx: &Context) {
    let mut session = ctx.session();
    session.cart.clear();
    tracing::info!("Cart cleared");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_qty() {
        assert_eq!(parse_size_qty("XL=3").unwrap(), ("XL".to_string(), 3));
        assert_eq!(parse_size_qty(" M = 0 ").unwrap(), ("M".to_string(), 0));
        assert!(parse_size_qty("M").is_err());
        assert!(parse_size_qty("=2").is_err());
        assert!(parse_size_qty("M=-1").is_err());
    }
}
