//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  (Product)      │──►│  id (token)     │       │
//! │  │  name           │   │  quantity ≥ 1   │   │  timestamp      │       │
//! │  │  description    │   └─────────────────┘   │  items (frozen) │       │
//! │  │  price (Points) │                         │  totalPoints    │       │
//! │  │  image          │                         └────────┬────────┘       │
//! │  └─────────────────┘                                  │                │
//! │                                              ┌────────▼────────┐       │
//! │                                              │   OrderStats    │       │
//! │                                              │  count / total  │       │
//! │                                              │  avgOrderValue  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! These types ARE the persisted format. The `orders` key, the export payload
//! and the import payload are all a JSON array of [`Order`]:
//!
//! ```json
//! [{
//!   "id": "3F9A1C0B2",
//!   "timestamp": "2024-12-24T18:30:00Z",
//!   "items": [{
//!     "id": "berry-merry-chaat", "name": "Berry Merry Chaat",
//!     "description": "...", "price": 30, "image": "https://...",
//!     "quantity": 2
//!   }],
//!   "totalPoints": 60
//! }]
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::points::Points;
use crate::ORDER_ID_LEN;

// =============================================================================
// Product
// =============================================================================

/// A treat in the static catalog.
///
/// Loaded once from configuration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (slug, e.g. `berry-merry-chaat`).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Short marketing description.
    pub description: String,

    /// Price per unit.
    pub price: Points,

    /// Image reference (URL or asset path).
    pub image: String,
}

impl Product {
    /// Convenience constructor used by the default catalog and tests.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Points,
        image: impl Into<String>,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            image: image.into(),
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A product line in the cart (and, frozen, in an order).
///
/// Serialized with the product fields flattened next to `quantity`, so a
/// line reads exactly like a product with one extra field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,

    /// Always at least 1 while the item is in a ledger.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a line with quantity 1.
    pub fn new(product: Product) -> Self {
        CartItem {
            product,
            quantity: 1,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Price × quantity.
    #[inline]
    pub fn line_total(&self) -> Points {
        self.product.price * self.quantity
    }
}

// =============================================================================
// Order
// =============================================================================

/// A finalized checkout.
///
/// ## Immutability
/// Fields are private: an order is built once (by checkout or by
/// deserialization) and only read afterwards. `items` is an owned copy, so
/// nothing done to the live cart can reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    id: String,

    #[ts(as = "String")]
    timestamp: DateTime<Utc>,

    items: Vec<CartItem>,

    total_points: Points,
}

impl Order {
    /// Builds an order, deriving `total_points` from the items.
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, items: Vec<CartItem>) -> Self {
        let total_points = sum_lines(&items);
        Order {
            id: id.into(),
            timestamp,
            items,
            total_points,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The recorded total. Equal to [`Order::computed_total`] for every order
    /// this crate creates; imports are checked by `validation::validate_order`.
    #[inline]
    pub fn total_points(&self) -> Points {
        self.total_points
    }

    /// Σ price × quantity over the frozen items.
    pub fn computed_total(&self) -> Points {
        sum_lines(&self.items)
    }

    /// Total number of units in the order.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

fn sum_lines(items: &[CartItem]) -> Points {
    items.iter().map(CartItem::line_total).sum()
}

/// Generates a short order id.
///
/// Nine uppercase hex characters taken from a UUID v4: about 68 billion
/// values, plenty for a single device's order log. Not a security token.
pub fn generate_order_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ORDER_ID_LEN);
    id.to_uppercase()
}

// =============================================================================
// Order Stats
// =============================================================================

/// Aggregate figures over an order log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderStats {
    pub count: usize,
    pub total_points: Points,
    /// Mean order value, one decimal place; 0 when there are no orders.
    pub avg_order_value: f64,
}

impl OrderStats {
    /// Derives stats from a slice of orders. Read-only.
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = orders.len();
        let total_points: Points = orders.iter().map(Order::total_points).sum();
        OrderStats {
            count,
            total_points,
            avg_order_value: total_points.average_over(count),
        }
    }
}

impl Default for OrderStats {
    fn default() -> Self {
        OrderStats::from_orders(&[])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
