//! # Interactive Session
//!
//! Reads one command per line, runs it, prints the result.
//!
//! ## Session Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopping                          Admin (after 5 quick taps)           │
//! │  ────────                          ─────                                │
//! │  catalog                           orders                               │
//! │  add <product-id>                  stats                                │
//! │  remove <product-id>               export                               │
//! │  qty <product-id> <delta>          import <json>                        │
//! │  cart                              reset --yes                          │
//! │  checkout                                                               │
//! │  ask <product-id>                  tap   (the logo)                     │
//! │  quit                                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage changes from other sessions are applied before every command.

use std::io::Write;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use bites_core::{Order, Product};
use bites_store::StoreError;

use crate::commands::cart::CartResponse;
use crate::commands::{admin, cart, catalog, order};
use crate::error::ApiError;
use crate::recommend::Recommender;
use crate::state::Session;

// =============================================================================
// Parsing
// =============================================================================

#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "storefront")]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SessionCommand {
    /// List the treats
    Catalog,
    /// Add one of a treat to the cart
    Add { product_id: String },
    /// Take a treat out of the cart
    Remove { product_id: String },
    /// Change a treat's quantity, e.g. `qty berry-merry-chaat -1`
    Qty {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Show the cart
    Cart,
    /// Place the order
    Checkout,
    /// Ask Santa about a treat
    Ask { product_id: String },
    /// Tap the store logo
    #[command(hide = true)]
    Tap,
    /// Order history (admin)
    Orders,
    /// Order statistics (admin)
    Stats,
    /// Print the order history as JSON (admin)
    Export,
    /// Merge orders exported elsewhere (admin)
    Import {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        payload: Vec<String>,
    },
    /// Delete all orders (admin)
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Leave the storefront
    #[command(alias = "exit")]
    Quit,
}

/// Parses one input line.
///
/// The `import` payload is kept byte-for-byte as typed after the command
/// word; splitting on whitespace would collapse runs of spaces inside JSON
/// strings.
pub fn parse_line(line: &str) -> Result<SessionCommand, clap::Error> {
    let mut command = SessionLine::try_parse_from(line.split_whitespace())?.command;

    if let SessionCommand::Import { payload } = &mut command {
        if let Some((_, rest)) = line.trim().split_once(char::is_whitespace) {
            *payload = vec![rest.trim().to_string()];
        }
    }

    Ok(command)
}

// =============================================================================
// Dispatch
// =============================================================================

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this (nothing if empty) and read the next line.
    Text(String),
    Quit,
}

/// Runs one command against the session.
pub async fn execute(
    session: &mut Session,
    recommender: &dyn Recommender,
    command: SessionCommand,
    now: Instant,
) -> Result<Reply, ApiError> {
    let text = match command {
        SessionCommand::Catalog => render_catalog(&catalog::list_products(session)),
        SessionCommand::Add { product_id } => {
            render_cart(&cart::add_to_cart(session, &product_id)?)
        }
        SessionCommand::Remove { product_id } => {
            render_cart(&cart::remove_from_cart(session, &product_id)?)
        }
        SessionCommand::Qty { product_id, delta } => {
            render_cart(&cart::update_cart_item(session, &product_id, delta)?)
        }
        SessionCommand::Cart => render_cart(&cart::get_cart(session)),
        SessionCommand::Checkout => {
            let placed = order::checkout(session)?;
            format!(
                "Order {} placed for {}. Merry Christmas!",
                placed.id(),
                placed.total_points()
            )
        }
        SessionCommand::Ask { product_id } => {
            let text = catalog::ask_santa(session, recommender, &product_id).await?;
            format!("Santa says: {}", text)
        }
        SessionCommand::Tap => {
            let tap = admin::tap_logo(session, now)?;
            match (tap.toggled, tap.unlocked) {
                (true, true) => "Admin mode unlocked".to_string(),
                (true, false) => "Admin mode locked".to_string(),
                (false, _) => String::new(),
            }
        }
        SessionCommand::Orders => render_orders(&order::list_orders(session)?),
        SessionCommand::Stats => {
            let stats = order::order_stats(session)?;
            format!(
                "Orders:  {}\nTotal:   {}\nAverage: {:.1} pts",
                stats.count, stats.total_points, stats.avg_order_value
            )
        }
        SessionCommand::Export => order::export_orders(session)?,
        SessionCommand::Import { payload } => {
            let imported = order::import_orders(session, &payload.join(" "))?;
            format!(
                "Merged {} new order(s); {} in history",
                imported.merged, imported.total
            )
        }
        SessionCommand::Reset { yes } => {
            order::reset_orders(session, yes)?;
            "Order history cleared".to_string()
        }
        SessionCommand::Quit => return Ok(Reply::Quit),
    };

    Ok(Reply::Text(text))
}

// =============================================================================
// Loop
// =============================================================================

/// Drives a session until `quit` or end of input.
pub async fn run_session<R, W>(
    session: &mut Session,
    recommender: &dyn Recommender,
    input: R,
    output: &mut W,
    startup_warning: Option<StoreError>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "Welcome to {}! Type `help` for commands.", session.store_name)?;
    if startup_warning.is_some() {
        writeln!(
            output,
            "Order history could not be read and was set aside; starting fresh."
        )?;
    }

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        session.sync_external();

        let command = match parse_line(line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "{}", err.render().to_string().trim_end())?;
                continue;
            }
        };

        match execute(session, recommender, command, Instant::now()).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Text(text)) if text.is_empty() => {}
            Ok(Reply::Text(text)) => writeln!(output, "{}", text)?,
            Err(err) => writeln!(output, "{}", err)?,
        }
    }

    writeln!(output, "Happy holidays!")?;
    info!("Session ended");
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn render_catalog(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| format!("{:<28} {:<28} {}\n    {}", p.id, p.name, p.price, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cart(cart: &CartResponse) -> String {
    if cart.items.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut lines: Vec<String> = cart
        .items
        .iter()
        .map(|item| {
            format!(
                "{:>3} x {:<28} {}",
                item.quantity,
                item.product.name,
                item.line_total()
            )
        })
        .collect();
    lines.push(format!(
        "Total: {} ({} treat(s))",
        cart.totals.total, cart.totals.count
    ));
    lines.join("\n")
}

fn render_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet".to_string();
    }

    orders
        .iter()
        .map(|o| {
            format!(
                "{}  {}  {:>8}  {} treat(s)",
                o.id(),
                o.timestamp().format("%Y-%m-%d %H:%M:%S"),
                o.total_points().to_string(),
                o.unit_count()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
