//! # State Module
//!
//! Session state for the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         Session                                 │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌──────────────┐ │   │
//! │  │  │  Catalog   │ │ CartLedger │ │ OrderStore │ │ AdminFlag +  │ │   │
//! │  │  │ (config,   │ │ (memory    │ │ (persisted │ │ AdminGate    │ │   │
//! │  │  │ read-only) │ │  only)     │ │  "orders") │ │              │ │   │
//! │  │  └────────────┘ └────────────┘ └─────┬──────┘ └──────┬───────┘ │   │
//! │  │                                      │               │         │   │
//! │  │  StorageEvents ──── drained before every command ────┘         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  One session runs one command at a time; no locking is needed.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
mod session;

pub use catalog::Catalog;
pub use session::Session;
