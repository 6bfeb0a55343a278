//! # bites-core: Pure Business Logic for Berry Merry Bites
//!
//! This crate is the **heart** of the storefront. It contains the cart,
//! order and statistics logic as plain functions and types with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Berry Merry Bites Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront session (apps/storefront)            │   │
//! │  │    catalog ──► add / qty / remove ──► checkout ──► orders      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bites-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  points   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │  Points   │  │CartLedger │  │  catalog  │  │   │
//! │  │   │   Order   │  │  average  │  │CartTotals │  │  imports  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                        ┌───────────┐                            │   │
//! │  │                        │   admin   │  tap counter               │   │
//! │  │                        └───────────┘                            │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bites-store (Persistence Layer)                 │   │
//! │  │          key-value store, Order Store, export / import          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, Order, OrderStats)
//! - [`points`] - Integer price unit
//! - [`cart`] - The Cart Ledger
//! - [`validation`] - Catalog and import invariants
//! - [`admin`] - Debounced admin gesture counter
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bites_core::{CartLedger, Points, Product};
//!
//! let chaat = Product::new("berry-merry-chaat", "Berry Merry Chaat", "", Points::new(30), "");
//!
//! let mut cart = CartLedger::new();
//! cart.add(&chaat);
//! cart.add(&chaat);
//! assert_eq!(cart.total(), Points::new(60));
//!
//! let order = cart.checkout().unwrap();
//! assert_eq!(order.total_points(), Points::new(60));
//! assert!(cart.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod cart;
pub mod error;
pub mod points;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use admin::{AdminGate, TapOutcome};
pub use cart::{CartLedger, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use points::Points;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Length of generated order ids.
pub const ORDER_ID_LEN: usize = 9;

/// Maximum length of any product or order id.
pub const MAX_ID_LEN: usize = 64;

/// Maximum number of products in the catalog.
///
/// ## Business Reason
/// The storefront is a single page of signature treats; a catalog beyond
/// this is a configuration mistake, not a bigger shop.
pub const MAX_CATALOG_PRODUCTS: usize = 24;

/// Taps on the hidden trigger needed to toggle admin mode.
pub const DEFAULT_ADMIN_TAPS: u32 = 5;

/// Maximum gap between two taps before the count starts over.
pub const DEFAULT_ADMIN_WINDOW_MS: u64 = 2_000;
