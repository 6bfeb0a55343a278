//! # Cart Ledger
//!
//! The customer's in-progress selection and its totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Customer Action          Ledger Call             State Change          │
//! │  ───────────────          ───────────             ────────────          │
//! │                                                                         │
//! │  "Add to Sack" ──────────► add(product) ────────► qty += 1 / push      │
//! │                                                                         │
//! │  "+" / "-" ──────────────► adjust_quantity() ───► qty = max(1, q + d)  │
//! │                                                                         │
//! │  "Remove" ───────────────► remove(id) ──────────► items.retain(..)     │
//! │                                                                         │
//! │  "Confirm and Order" ────► checkout() ──────────► Order + items.clear()│
//! │                                                                         │
//! │  Badge / Sack Total ─────► count() / total() ───► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by product id (adding the same product bumps quantity)
//! - Quantity is always ≥ 1; "-" on a single unit leaves it at 1
//! - Only `remove` (or checkout/clear) takes a line out of the ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::points::Points;
use crate::types::{generate_order_id, CartItem, Order, Product};

/// The in-memory cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartLedger {
    items: Vec<CartItem>,
}

impl CartLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        CartLedger { items: Vec::new() }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in the ledger: quantity + 1
    /// - Otherwise: appended with quantity 1
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self.find_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(1);
            debug!(product_id = %product.id, quantity = item.quantity, "Cart quantity increased");
            return;
        }

        self.items.push(CartItem::new(product.clone()));
        debug!(product_id = %product.id, "Product added to cart");
    }

    /// Removes the line for `product_id`. Absent ids are ignored.
    pub fn remove(&mut self, product_id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);

        if self.items.len() != before {
            debug!(product_id = %product_id, "Product removed from cart");
        }
    }

    /// Shifts a line's quantity by `delta`, never below 1.
    ///
    /// Absent ids are ignored. Going below one unit is not a removal; the
    /// customer must use `remove` for that.
    pub fn adjust_quantity(&mut self, product_id: &str, delta: i64) {
        if let Some(item) = self.find_mut(product_id) {
            let target = i64::from(item.quantity).saturating_add(delta);
            let clamped = target.clamp(1, i64::from(u32::MAX));
            item.quantity = u32::try_from(clamped).unwrap_or(u32::MAX);
            debug!(product_id = %product_id, delta, quantity = item.quantity, "Cart quantity adjusted");
        }
    }

    /// Σ price × quantity.
    pub fn total(&self) -> Points {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ quantity (the badge number, not the number of lines).
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Empties the ledger without producing an order.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Finalizes the cart into an [`Order`] with a fresh id and the current
    /// time, then empties the ledger.
    ///
    /// ## Errors
    /// [`CoreError::EmptyCart`] when there is nothing to order; the ledger is
    /// left as it was.
    pub fn checkout(&mut self) -> CoreResult<Order> {
        self.checkout_at(generate_order_id(), Utc::now())
    }

    /// [`CartLedger::checkout`] with the id and timestamp supplied.
    pub fn checkout_at(
        &mut self,
        order_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<Order> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        // Moving the items out leaves the ledger empty and hands the order
        // sole ownership of its snapshot.
        let items = std::mem::take(&mut self.items);
        let order = Order::new(order_id, timestamp, items);

        debug!(
            order_id = %order.id(),
            total_points = order.total_points().value(),
            lines = order.items().len(),
            "Cart checked out"
        );

        Ok(order)
    }

    fn find_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id() == product_id)
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub count: u64,
    pub total: Points,
}

impl From<&CartLedger> for CartTotals {
    fn from(cart: &CartLedger) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            count: cart.count(),
            total: cart.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_product(id: &str, price: u64) -> Product {
        Product::new(
            id,
            format!("Product {}", id),
            "A festive test treat",
            Points::new(price),
            format!("https://img.example/{}.jpg", id),
        )
    }

    fn assert_ledger_invariants(cart: &CartLedger) {
        let expected: u64 = cart
            .items()
            .iter()
            .map(|i| i.product.price.value() * u64::from(i.quantity))
            .sum();
        assert_eq!(cart.total().value(), expected);

        let mut ids: Vec<&str> = cart.items().iter().map(CartItem::product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cart.item_count());

        assert!(cart.items().iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_add_new_and_existing() {
        let mut cart = CartLedger::new();
        let chaat = test_product("chaat", 30);

        cart.add(&chaat);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.count(), 1);

        cart.add(&chaat);
        assert_eq!(cart.item_count(), 1); // Still one line
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Points::new(60));
    }

    #[test]
    fn test_remove_present_and_absent() {
        let mut cart = CartLedger::new();
        cart.add(&test_product("a", 30));
        cart.add(&test_product("b", 10));

        cart.remove("missing");
        assert_eq!(cart.item_count(), 2);

        cart.remove("a");
        assert_eq!(cart.item_count(), 1);
        assert!(cart.get("a").is_none());
        assert_eq!(cart.total(), Points::new(10));
    }

    #[test]
    fn test_adjust_quantity_clamps_at_one() {
        let mut cart = CartLedger::new();
        cart.add(&test_product("a", 30));

        cart.adjust_quantity("a", -1);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(1));

        cart.adjust_quantity("a", -100);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(1));
        assert_eq!(cart.item_count(), 1); // Not removed

        cart.adjust_quantity("a", 4);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(5));

        cart.adjust_quantity("a", i64::MIN);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(1));
    }

    #[test]
    fn test_adjust_quantity_absent_is_noop() {
        let mut cart = CartLedger::new();
        cart.add(&test_product("a", 30));

        cart.adjust_quantity("b", 3);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_worked_example() {
        let mut cart = CartLedger::new();
        let a = test_product("a", 30);

        cart.add(&a);
        assert_eq!((cart.total().value(), cart.count()), (30, 1));

        cart.add(&a);
        assert_eq!((cart.total().value(), cart.count()), (60, 2));

        cart.adjust_quantity("a", -5);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(1));
        assert_eq!(cart.total().value(), 30);

        let order = cart.checkout().unwrap();
        assert_eq!(order.total_points(), Points::new(30));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].product_id(), "a");
        assert_eq!(order.items()[0].quantity, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_checkout_empty_fails_and_leaves_ledger() {
        let mut cart = CartLedger::new();
        let result = cart.checkout();

        assert!(matches!(result, Err(CoreError::EmptyCart)));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Points::zero());
    }

    #[test]
    fn test_checkout_snapshot_isolation() {
        let mut cart = CartLedger::new();
        let a = test_product("a", 30);
        let b = test_product("b", 12);
        cart.add(&a);
        cart.add(&b);
        cart.adjust_quantity("b", 2);

        let ts = Utc.with_ymd_and_hms(2024, 12, 24, 12, 0, 0).unwrap();
        let order = cart.checkout_at("ORDER1", ts).unwrap();
        let frozen = order.items().to_vec();

        assert!(cart.is_empty());

        // Mutate the live ledger after checkout
        cart.add(&a);
        cart.adjust_quantity("a", 10);
        cart.add(&b);
        cart.remove("b");

        assert_eq!(order.items(), frozen.as_slice());
        assert_eq!(order.id(), "ORDER1");
        assert_eq!(order.timestamp(), ts);
        assert_eq!(order.total_points(), Points::new(30 + 36));
    }

    #[test]
    fn test_invariants_hold_over_mixed_operations() {
        let catalog = [
            test_product("a", 30),
            test_product("b", 25),
            test_product("c", 7),
        ];
        let mut cart = CartLedger::new();

        // Deterministic walk over every operation with varying arguments
        for step in 0..60_i64 {
            let product = &catalog[(step % 3) as usize];
            match step % 5 {
                0 | 1 => cart.add(product),
                2 => cart.adjust_quantity(&product.id, (step % 7) - 4),
                3 => cart.adjust_quantity(&product.id, -100),
                _ => {
                    if step % 4 == 0 {
                        cart.remove(&product.id);
                    }
                }
            }
            assert_ledger_invariants(&cart);
        }
    }

    #[test]
    fn test_cart_totals() {
        let mut cart = CartLedger::new();
        cart.add(&test_product("a", 30));
        cart.add(&test_product("a", 30));
        cart.add(&test_product("b", 5));

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.count, 3);
        assert_eq!(totals.total, Points::new(65));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartLedger::new();
        cart.add(&test_product("a", 30));
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }
}
