//! # Berry Merry Bites Storefront
//!
//! The terminal storefront: configuration, logging, session state and the
//! command loop.
//!
//! ## Module Organization
//! ```text
//! bites_storefront/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── storefront.toml + BITES_* environment
//! ├── error.rs        ◄─── API error type for commands
//! ├── recommend.rs    ◄─── Santa's recommendation + fallbacks
//! ├── shell.rs        ◄─── Line parsing, dispatch, rendering
//! ├── state/
//! │   ├── mod.rs      ◄─── State exports
//! │   ├── catalog.rs  ◄─── Product lookup
//! │   └── session.rs  ◄─── Cart, orders, admin flag + gate
//! └── commands/
//!     ├── mod.rs      ◄─── Command exports
//!     ├── catalog.rs  ◄─── Listing, asking Santa
//!     ├── cart.rs     ◄─── Cart manipulation
//!     ├── order.rs    ◄─── Checkout, history, export/import, reset
//!     └── admin.rs    ◄─── Logo taps
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod recommend;
pub mod shell;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use directories::ProjectDirs;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bites_store::{FileStore, MemoryStore, SharedKv};

use config::StorefrontConfig;
use recommend::OfflineRecommender;
use state::Session;

/// Command-line arguments of the `bites` binary.
#[derive(Debug, Parser)]
#[command(name = "bites", author, version, about = "Berry Merry Bites storefront")]
pub struct Cli {
    /// Config file (default: storefront.toml in the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for storage.json (overrides config and BITES_DATA_DIR)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing survives the session
    #[arg(long, conflicts_with = "data_dir")]
    pub memory: bool,
}

/// Runs the storefront.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Storefront Startup                                │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: info,bites=debug; override with RUST_LOG                 │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → storefront.toml → BITES_* env → --data-dir             │
/// │                                                                         │
/// │  3. Open Storage ─────────────────────────────────────────────────────► │
/// │     • --memory: MemoryStore                                             │
/// │     • otherwise FileStore in the data directory                         │
/// │                                                                         │
/// │  4. Open Session ─────────────────────────────────────────────────────► │
/// │     • order log (fresh start if unreadable), admin flag                 │
/// │                                                                         │
/// │  5. Command Loop on stdin/stdout until quit or EOF                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Berry Merry Bites storefront");

    let mut config = StorefrontConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let kv: SharedKv = if cli.memory {
        info!("Using in-memory storage");
        Arc::new(MemoryStore::new())
    } else {
        let data_dir = get_data_dir(&config)?;
        info!(?data_dir, "Data directory determined");
        Arc::new(FileStore::open(&data_dir)?)
    };

    let (mut session, warning) = Session::open(kv, &config)?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    shell::run_session(&mut session, &OfflineRecommender, stdin, &mut stdout, warning).await?;

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never mix with session output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bites_store=trace` - Trace storage only
/// - Default: `info,bites=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bites=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the data directory.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.berry-merry.bites`
/// - **Windows**: `%APPDATA%\berry-merry\bites\data`
/// - **Linux**: `~/.local/share/bites`
///
/// `[storage] data_dir`, `BITES_DATA_DIR` and `--data-dir` take precedence.
fn get_data_dir(config: &StorefrontConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(dir) = &config.storage.data_dir {
        return Ok(dir.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "berry-merry", "bites")
        .ok_or("Could not determine app data directory")?;

    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["bites", "--memory"]).unwrap();
        assert!(cli.memory);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["bites", "-c", "shop.toml", "--data-dir", "/tmp/bites"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("shop.toml")));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/bites")));

        assert!(Cli::try_parse_from(["bites", "--memory", "--data-dir", "/tmp"]).is_err());
    }

    #[test]
    fn test_configured_data_dir_wins() {
        let mut config = StorefrontConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/bites"));

        assert_eq!(get_data_dir(&config).unwrap(), PathBuf::from("/srv/bites"));
    }
}
