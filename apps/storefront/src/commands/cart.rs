//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Review  │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  (cart)  │     │ recorded │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   add_to_cart                      checkout            │
//! │                   update_cart_item                 (order.rs)          │
//! │                   remove_from_cart                       │              │
//! │                                                          ▼              │
//! │                                                   (back to empty)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities never drop below 1 through `update_cart_item`; taking a treat
//! out is always an explicit `remove_from_cart`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use bites_core::{CartItem, CartLedger, CartTotals};

use crate::error::ApiError;
use crate::state::Session;

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<&CartLedger> for CartResponse {
    fn from(cart: &CartLedger) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(session: &Session) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from(&session.cart)
}

/// Adds one unit of a catalog product.
///
/// ## Behavior
/// - Product already in cart: quantity + 1
/// - Otherwise: new line with quantity 1
pub fn add_to_cart(session: &mut Session, product_id: &str) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");

    let product = session.catalog.get(product_id)?;
    session.cart.add(product);

    Ok(CartResponse::from(&session.cart))
}

/// Changes a line's quantity by `delta`, never below 1.
///
/// ## Errors
/// `NOT_FOUND` if the id is not in the catalog. A catalog product that is
/// not in the cart is left alone.
pub fn update_cart_item(
    session: &mut Session,
    product_id: &str,
    delta: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, delta, "update_cart_item command");

    session.catalog.get(product_id)?;
    session.cart.adjust_quantity(product_id, delta);

    Ok(CartResponse::from(&session.cart))
}

/// Removes a line from the cart.
pub fn remove_from_cart(session: &mut Session, product_id: &str) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");

    session.catalog.get(product_id)?;
    session.cart.remove(product_id);

    Ok(CartResponse::from(&session.cart))
}
