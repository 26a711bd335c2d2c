//! Shopping cart state.

use legora_core::{CartLine, LineKey, LineSelector, ProductSnapshot};
use rust_decimal::Decimal;

use crate::persistence::{KeyValueStore, Snapshot};

/// Storage key of the persisted cart.
pub const CART_STORAGE_KEY: &str = "app_cart_v1";

/// Ordered cart lines with write-through persistence.
///
/// The store is read exactly once, in [`CartStore::open`]. Every mutation
/// afterwards rewrites the whole collection. Storage failures are logged and
/// otherwise ignored.
///
/// Invariants:
/// - at most one line per `(id, size)`
/// - every held line has `qty >= 1`
#[derive(Debug)]
pub struct CartStore<S> {
    lines: Vec<CartLine>,
    snapshot: Snapshot<S>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart and hydrate it from `store`.
    ///
    /// Stored lines with `qty == 0` are dropped and duplicate identities are
    /// merged, so a hand-edited snapshot cannot break the invariants.
    pub fn open(store: S) -> Self {
        let snapshot = Snapshot::new(store, CART_STORAGE_KEY);
        let mut lines: Vec<CartLine> = Vec::new();
        for line in snapshot.load::<CartLine>() {
            if line.qty == 0 {
                continue;
            }
            match lines.iter_mut().find(|held| held.is(&line.key())) {
                Some(held) => held.qty = held.qty.saturating_add(line.qty),
                None => lines.push(line),
            }
        }
        tracing::debug!(lines = lines.len(), "cart opened");
        Self { lines, snapshot }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line with this exact identity.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.is(key))
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.qty)).sum()
    }

    /// Sum of `qty * price`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line.line_total()).unwrap_or(Decimal::MAX)
            })
    }

    /// Add `qty` units of `product`.
    ///
    /// Accumulates onto an existing line with the same identity, otherwise
    /// appends a new line. Stock limits are the caller's concern. A zero
    /// quantity changes nothing and is not persisted.
    pub fn add_item(&mut self, product: ProductSnapshot, qty: u32) {
        if qty == 0 {
            return;
        }
        let key = product.key();
        match self.lines.iter_mut().find(|line| line.is(&key)) {
            Some(line) => line.qty = line.qty.saturating_add(qty),
            None => self.lines.push(CartLine::new(product, qty)),
        }
        self.persist();
    }

    /// Add several sizes of one product at once, one line per size.
    ///
    /// Entries with a zero quantity are skipped. Returns the number of units
    /// added.
    pub fn add_sizes(&mut self, product: &ProductSnapshot, sizes: &[(String, u32)]) -> u64 {
        let mut added = 0u64;
        for (size, qty) in sizes {
            if *qty == 0 {
                continue;
            }
            let key = LineKey::new(product.id.clone(), Some(size.clone()));
            match self.lines.iter_mut().find(|line| line.is(&key)) {
                Some(line) => line.qty = line.qty.saturating_add(*qty),
                None => self
                    .lines
                    .push(CartLine::new(product.with_size(Some(size.clone())), *qty)),
            }
            added += u64::from(*qty);
        }
        if added > 0 {
            self.persist();
        }
        added
    }

    /// Remove every line the selector matches.
    pub fn remove_item(&mut self, selector: &LineSelector) {
        self.lines.retain(|line| !selector.matches(&line.key()));
        self.persist();
    }

    /// Add one unit to every line the selector matches.
    pub fn increment(&mut self, selector: &LineSelector) {
        for line in &mut self.lines {
            if selector.matches(&line.key()) {
                line.qty = line.qty.saturating_add(1);
            }
        }
        self.persist();
    }

    /// Take one unit from every line the selector matches, dropping lines
    /// that reach zero.
    pub fn decrement(&mut self, selector: &LineSelector) {
        for line in &mut self.lines {
            if selector.matches(&line.key()) {
                line.qty = line.qty.saturating_sub(1);
            }
        }
        self.lines.retain(|line| line.qty > 0);
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.snapshot.save(&self.lines) {
            tracing::warn!(key = CART_STORAGE_KEY, error = %e, "failed to persist cart");
        }
    }
}
