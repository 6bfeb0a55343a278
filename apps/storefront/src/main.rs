//! # Berry Merry Bites Entry Point
//!
//! ```text
//! $ bites --data-dir ./shop
//! Welcome to Berry Merry Bites! Type `help` for commands.
//! > add berry-merry-chaat
//!   1 x Berry Merry Chaat            30 pts
//! Total: 30 pts (1 treat(s))
//! > checkout
//! Order 3F9A1C0B2 placed for 30 pts. Merry Christmas!
//! ```
//!
//! The actual setup is in lib.rs for testability.

use clap::Parser;

use bites_storefront::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = bites_storefront::run(cli).await {
        tracing::error!("Storefront failed: {e}");
        eprintln!("bites: {e}");
        std::process::exit(1);
    }
}
