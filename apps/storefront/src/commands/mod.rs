//! # Commands Module
//!
//! Every operation the session offers, one function per command.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Product listing, Santa's recommendation
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── order.rs    ◄─── Checkout, history, export/import, reset
//! └── admin.rs    ◄─── Hidden logo-tap gesture
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  stdin: "qty berry-merry-chaat -1"                                      │
//! │         │                                                               │
//! │         │ (clap, no binary name)                                        │
//! │         ▼                                                               │
//! │  SessionCommand::Qty { product_id, delta }                              │
//! │         │                                                               │
//! │         │ session.sync_external()  ◄── other sessions' writes first      │
//! │         ▼                                                               │
//! │  fn update_cart_item(                                                   │
//! │      session: &mut Session,                                             │
//! │      product_id: &str,                                                  │
//! │      delta: i64,                                                        │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Printed response, or "[NOT_FOUND] Product not found: ..."              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never print; rendering belongs to the session loop.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod order;
