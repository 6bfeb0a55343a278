//! # Order Commands
//!
//! Checkout, plus the admin-only order history tools.
//!
//! ## Export / Import Between Devices
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Manual Order Sync                                    │
//! │                                                                         │
//! │  Device A (admin)                    Device B (admin)                   │
//! │  ────────────────                    ────────────────                   │
//! │  export ──► [{"id":"3F9A1C0B2",...}]                                    │
//! │                    │                                                    │
//! │                    └──── copy / paste ────► import [{"id":...}]         │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                     merged 1 new order (4 total)        │
//! │                                                                         │
//! │  Importing the same text twice merges nothing the second time.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use bites_core::{Order, OrderStats};

use crate::error::ApiError;
use crate::state::Session;

/// Result of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Orders added by this import.
    pub merged: usize,
    /// Orders in the log afterwards.
    pub total: usize,
}

/// Places the order for everything in the cart.
///
/// ## Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Snapshot the cart into an Order (empty cart → CART_ERROR)          │
/// │  2. Record the order (prepend + persist)                               │
/// │  3. Only then empty the cart                                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
/// If recording fails the cart is left exactly as it was, so the customer
/// can try again.
pub fn checkout(session: &mut Session) -> Result<Order, ApiError> {
    debug!(lines = session.cart.item_count(), "checkout command");

    let mut pending = session.cart.clone();
    let order = pending.checkout()?;

    session.orders.record(order.clone())?;
    session.cart = pending;

    Ok(order)
}

/// Lists every recorded order, newest first. Admin only.
pub fn list_orders(session: &Session) -> Result<Vec<Order>, ApiError> {
    debug!("list_orders command");
    session.require_admin()?;

    Ok(session.orders.orders().to_vec())
}

/// Order count, total and average. Admin only.
pub fn order_stats(session: &Session) -> Result<OrderStats, ApiError> {
    debug!("order_stats command");
    session.require_admin()?;

    Ok(session.orders.stats())
}

/// Serializes the order log for copying to another device. Admin only.
pub fn export_orders(session: &Session) -> Result<String, ApiError> {
    debug!("export_orders command");
    session.require_admin()?;

    Ok(session.orders.export()?)
}

/// Merges orders exported from another device. Admin only.
pub fn import_orders(session: &mut Session, serialized: &str) -> Result<ImportResponse, ApiError> {
    debug!(bytes = serialized.len(), "import_orders command");
    session.require_admin()?;

    let merged = session.orders.import(serialized)?;
    Ok(ImportResponse {
        merged,
        total: session.orders.len(),
    })
}

/// Deletes the whole order log. Admin only, and `confirmed` must be set.
pub fn reset_orders(session: &mut Session, confirmed: bool) -> Result<(), ApiError> {
    debug!(confirmed, "reset_orders command");
    session.require_admin()?;

    session.orders.reset(confirmed)?;
    Ok(())
}
