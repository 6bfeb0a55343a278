//! # Store Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in storefront app) ← code + message                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Session prints a user-friendly notice                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Import payload is not a valid array of orders.
    ///
    /// ## When This Occurs
    /// - Pasted text is not JSON, or not an array
    /// - An element is missing fields or has the wrong types
    /// - An order breaks an invariant (e.g. `totalPoints` ≠ item sum)
    ///
    /// The store is left untouched.
    #[error("Import rejected: {reason}")]
    MalformedImport { reason: String },

    /// A persisted value exists but cannot be parsed.
    ///
    /// ## When This Occurs
    /// - The `orders` key was hand-edited or truncated
    /// - Another writer stored something that is not an order array
    #[error("Persisted '{key}' is unreadable: {reason}")]
    PersistedDataCorrupt { key: String, reason: String },

    /// An order with this id is already recorded.
    #[error("Order {0} already recorded")]
    DuplicateOrder(String),

    /// `reset` was called without confirmation.
    #[error("Reset requires explicit confirmation")]
    ResetNotConfirmed,

    /// The key-value store refused a write because it is full.
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, quota {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The storage file exists but is not a JSON object of strings.
    #[error("Storage file {path:?} is unreadable: {reason}")]
    StorageFormat { path: PathBuf, reason: String },

    /// File system failure.
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a value for storage failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a MalformedImport error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        StoreError::MalformedImport {
            reason: reason.into(),
        }
    }

    /// Creates a PersistedDataCorrupt error.
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::PersistedDataCorrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::malformed("expected an array").to_string(),
            "Import rejected: expected an array"
        );
        assert_eq!(
            StoreError::corrupt("orders", "EOF while parsing").to_string(),
            "Persisted 'orders' is unreadable: EOF while parsing"
        );
        assert_eq!(
            StoreError::DuplicateOrder("ABC".into()).to_string(),
            "Order ABC already recorded"
        );
    }
}
