//! # Error Types
//!
//! Domain-specific error types for bites-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bites-core errors (this file)                                         │
//! │  ├── CoreError        - Cart / catalog domain errors                   │
//! │  └── ValidationError  - Shape and invariant violations                 │
//! │                                                                         │
//! │  bites-store errors (separate crate)                                   │
//! │  └── StoreError       - Persistence, import and load failures          │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── ApiError         - What the session prints                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError/StoreError → ApiError → Terminal    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with nothing in the cart.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: (empty)
    ///      │
    ///      ▼
    /// checkout()
    ///      │
    ///      ▼
    /// EmptyCart ── ledger untouched, no order recorded
    ///      │
    ///      ▼
    /// Session shows: "Your cart is empty"
    /// ```
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Shape and invariant violations.
///
/// Raised while validating the static catalog at startup and every order
/// arriving through an import.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A derived value disagrees with what it is derived from.
    #[error("{field} is {actual}, expected {expected}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Duplicate value (e.g., two catalog entries with one id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Collection has more entries than allowed.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Cannot check out an empty cart"
        );
        assert_eq!(
            CoreError::ProductNotFound("gingerbread".to_string()).to_string(),
            "Product not found: gingerbread"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Mismatch {
            field: "totalPoints".to_string(),
            expected: "60".to_string(),
            actual: "50".to_string(),
        };
        assert_eq!(err.to_string(), "totalPoints is 50, expected 60");

        let err = ValidationError::Duplicate {
            field: "product id".to_string(),
            value: "berry-merry-chaat".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "product id 'berry-merry-chaat' already exists"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
