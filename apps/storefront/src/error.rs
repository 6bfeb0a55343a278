//! # API Error Type
//!
//! Unified error type for session commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Session line: "checkout"                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::QuotaExceeded ────────┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Domain Error? ─── CoreError::EmptyCart ──────── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Session prints: "[CART_ERROR] Your cart is empty"                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! `ApiError` serializes with a machine-readable `code` and a human-readable
//! `message`, so a web frontend can consume the same shape.

use serde::Serialize;

use bites_core::CoreError;
use bites_store::StoreError;

/// Error returned from session commands.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: candy-cane"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown product or order
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation failed (e.g. checkout of an empty cart)
    CartError,

    /// Command needs admin mode
    AdminRequired,

    /// Import payload rejected
    ImportRejected,

    /// Order id already recorded
    Conflict,

    /// Destructive command issued without confirmation
    ConfirmationRequired,

    /// Key-value storage failed or holds unreadable data
    StorageError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an admin-required error.
    pub fn admin_required() -> Self {
        ApiError::new(
            ErrorCode::AdminRequired,
            "Admin mode required. Tap the logo to unlock.",
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, "Your cart is empty"),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedImport { reason } => ApiError::new(
                ErrorCode::ImportRejected,
                format!("Import rejected, nothing was merged: {}", reason),
            ),
            StoreError::PersistedDataCorrupt { key, reason } => {
                tracing::warn!(key = %key, reason = %reason, "Persisted data unreadable");
                ApiError::new(
                    ErrorCode::StorageError,
                    "Order history is unreadable; showing what this session knows",
                )
            }
            StoreError::DuplicateOrder(id) => {
                ApiError::new(ErrorCode::Conflict, format!("Order {} already recorded", id))
            }
            StoreError::ResetNotConfirmed => ApiError::new(
                ErrorCode::ConfirmationRequired,
                "Reset deletes every order. Repeat with --yes to confirm.",
            ),
            StoreError::QuotaExceeded { key, needed, quota } => {
                tracing::error!(key = %key, needed, quota, "Storage quota exceeded");
                ApiError::new(ErrorCode::StorageError, "Storage is full; nothing was saved")
            }
            StoreError::StorageFormat { path, reason } => {
                tracing::error!(?path, reason = %reason, "Storage file unreadable");
                ApiError::new(ErrorCode::StorageError, "Storage file is damaged")
            }
            StoreError::Io(e) => {
                tracing::error!("Storage I/O failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
            StoreError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::internal("Could not serialize orders")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "[{}] {}", code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use bites_core::ValidationError;

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from(CoreError::EmptyCart);
        assert_eq!(err.code, ErrorCode::CartError);

        let err = ApiError::from(CoreError::ProductNotFound("candy-cane".into()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: candy-cane");

        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "catalog".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_store_error_mapping() {
        let err = ApiError::from(StoreError::malformed("expected a sequence"));
        assert_eq!(err.code, ErrorCode::ImportRejected);
        assert!(err.message.contains("expected a sequence"));

        let err = ApiError::from(StoreError::ResetNotConfirmed);
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);

        let err = ApiError::from(StoreError::DuplicateOrder("ABC123DEF".into()));
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::from(StoreError::Io(std::io::Error::other("/secret/path: EACCES")));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("secret"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::admin_required()).unwrap();
        assert_eq!(json["code"], "ADMIN_REQUIRED");
        assert!(json["message"].is_string());
    }

    #[test]
    fn test_display() {
        let err = ApiError::from(CoreError::EmptyCart);
        assert_eq!(err.to_string(), "[CART_ERROR] Your cart is empty");
    }
}
