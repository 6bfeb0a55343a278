//! # bites-store: Persistence Layer for Berry Merry Bites
//!
//! Everything that survives a restart lives here: the order log and the admin
//! flag, both kept in a string key-value store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         bites-store                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │   OrderStore (orders.rs)     │   │   AdminFlag (admin.rs)       │   │
//! │  │   record / export / import   │   │   "admin_unlocked" = "true"  │   │
//! │  │   reset / stats / refresh    │   │                              │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 │  key "orders"                    │                    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │            KeyValueStore (kv/)  +  storage events               │   │
//! │  │            MemoryStore  |  FileStore (storage.json)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bites_core::{CartLedger, Points, Product};
//! use bites_store::{MemoryStore, OrderStore};
//!
//! let mut store = OrderStore::open(Arc::new(MemoryStore::new())).unwrap();
//!
//! let mut cart = CartLedger::new();
//! cart.add(&Product::new("chaat", "Berry Merry Chaat", "", Points::new(30), ""));
//! store.record(cart.checkout().unwrap()).unwrap();
//!
//! let exported = store.export().unwrap();
//! assert_eq!(store.import(&exported).unwrap(), 0);
//! assert_eq!(store.stats().count, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod error;
pub mod kv;
pub mod orders;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use admin::AdminFlag;
pub use error::{StoreError, StoreResult};
pub use kv::{
    FileStore, KeyValueStore, MemoryStore, SharedKv, StorageEvent, StorageEvents,
};
pub use orders::OrderStore;

// =============================================================================
// Storage Keys
// =============================================================================

/// Key holding the JSON array of orders, newest first.
pub const ORDERS_KEY: &str = "orders";

/// Key holding `"true"` while admin mode is on; absent otherwise.
pub const ADMIN_KEY: &str = "admin_unlocked";

/// Key receiving an unreadable `orders` value before the log starts fresh.
pub const CORRUPT_BACKUP_KEY: &str = "orders.corrupt";
