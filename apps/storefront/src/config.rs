//! # Storefront Configuration
//!
//! Configuration management for the storefront session.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BITES_STORE_NAME="Berry Merry Bites"                               │
//! │     BITES_DATA_DIR=/var/lib/bites                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/bites/storefront.toml (Linux)                            │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     two-treat festive catalog, 5 taps within 2s                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [store]
//! name = "Berry Merry Bites"
//!
//! [storage]
//! data_dir = "/var/lib/bites"
//!
//! [admin]
//! taps = 5
//! window_ms = 2000
//!
//! [recommend]
//! timeout_ms = 3000
//!
//! [[catalog]]
//! id = "berry-merry-chaat"
//! name = "Berry Merry Chaat"
//! description = "Sev puri on Monaco biscuits"
//! price = 30
//! image = "https://img.example/chaat.jpg"
//! ```
//!
//! A file that declares `[[catalog]]` replaces the default catalog entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use bites_core::validation::validate_catalog;
use bites_core::{AdminGate, Points, Product, ValidationError};
use bites_core::{DEFAULT_ADMIN_TAPS, DEFAULT_ADMIN_WINDOW_MS};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The catalog breaks a catalog rule (empty, duplicate id, zero price).
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] ValidationError),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Shown in the session banner.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Berry Merry Bites".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding `storage.json`.
    /// Default: the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// `[admin]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Logo taps needed to toggle admin mode.
    #[serde(default = "default_taps")]
    pub taps: u32,

    /// Longest pause between taps before counting starts over (milliseconds).
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_taps() -> u32 {
    DEFAULT_ADMIN_TAPS
}

fn default_window_ms() -> u64 {
    DEFAULT_ADMIN_WINDOW_MS
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings {
            taps: default_taps(),
            window_ms: default_window_ms(),
        }
    }
}

/// `[recommend]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendSettings {
    /// Upper bound on one recommendation request (milliseconds).
    #[serde(default = "default_recommend_timeout")]
    pub timeout_ms: u64,
}

fn default_recommend_timeout() -> u64 {
    3_000
}

impl Default for RecommendSettings {
    fn default() -> Self {
        RecommendSettings {
            timeout_ms: default_recommend_timeout(),
        }
    }
}

/// The festive launch catalog.
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product::new(
            "berry-merry-chaat",
            "Berry Merry Chaat",
            "A delightful fusion of savory sev puri served on crisp Monaco biscuits, \
             topped with festive pomegranate \"berries\", fresh tomatoes, onions, and \
             zesty chutneys.",
            Points::new(30),
            "https://img-global.cpcdn.com/recipes/01c2662efc0b4bd2/1200x630cq80/photo.jpg",
        ),
        Product::new(
            "merry-strawberry-chocolate",
            "Merry StrawBERRY chocolate",
            "Luscious fresh strawberries layered with rich molten chocolate in an \
             elegant glass, finished with a dusting of holiday snow.",
            Points::new(30),
            "https://images.unsplash.com/photo-1488477181946-6428a0291777?auto=format&fit=crop&q=80&w=800",
        ),
    ]
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub admin: AdminSettings,

    #[serde(default)]
    pub recommend: RecommendSettings,

    #[serde(default = "default_catalog")]
    pub catalog: Vec<Product>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            store: StoreSettings::default(),
            storage: StorageSettings::default(),
            admin: AdminSettings::default(),
            recommend: RecommendSettings::default(),
            catalog: default_catalog(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    ///
    /// An explicitly given file must exist; the platform default may be
    /// missing.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        info!(
            store = %config.store.name,
            products = config.catalog.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parses one TOML file; missing sections take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading storefront config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store name must not be empty".into()));
        }

        if self.admin.taps == 0 {
            return Err(ConfigError::Invalid(
                "admin taps must be greater than 0".into(),
            ));
        }

        if self.admin.window_ms == 0 {
            return Err(ConfigError::Invalid(
                "admin window_ms must be greater than 0".into(),
            ));
        }

        if self.recommend.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "recommend timeout_ms must be greater than 0".into(),
            ));
        }

        validate_catalog(&self.catalog)?;
        Ok(())
    }

    /// Applies `BITES_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup`; unparsable numbers are ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("BITES_STORE_NAME") {
            debug!(name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Some(dir) = lookup("BITES_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(taps) = lookup("BITES_ADMIN_TAPS") {
            match taps.parse::<u32>() {
                Ok(t) => self.admin.taps = t,
                Err(_) => warn!(value = %taps, "Ignoring invalid BITES_ADMIN_TAPS"),
            }
        }

        if let Some(window) = lookup("BITES_ADMIN_WINDOW_MS") {
            match window.parse::<u64>() {
                Ok(ms) => self.admin.window_ms = ms,
                Err(_) => warn!(value = %window, "Ignoring invalid BITES_ADMIN_WINDOW_MS"),
            }
        }

        if let Some(timeout) = lookup("BITES_RECOMMEND_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.recommend.timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring invalid BITES_RECOMMEND_TIMEOUT_MS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "berry-merry", "bites")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// A fresh admin gate with the configured threshold and window.
    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin.taps, Duration::from_millis(self.admin.window_ms))
    }

    pub fn recommend_timeout(&self) -> Duration {
        Duration::from_millis(self.recommend.timeout_ms)
    }
}
