//! # Validation Module
//!
//! Invariant checks for data that enters from outside the process.
//!
//! ## Validation Points
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  storefront.toml ──► validate_catalog() ──► Catalog accepted            │
//! │                       • ids unique and non-empty                        │
//! │                       • prices positive                                 │
//! │                                                                         │
//! │  Pasted export  ──► serde (shape) ──► validate_order() ──► Merge        │
//! │                       • id present                                      │
//! │                       • at least one line, quantities ≥ 1               │
//! │                       • totalPoints == Σ price × quantity               │
//! │                                                                         │
//! │  Orders produced by CartLedger::checkout satisfy these by construction. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bites_core::validation::validate_product;
//! use bites_core::{Points, Product};
//!
//! let chaat = Product::new("berry-merry-chaat", "Berry Merry Chaat", "", Points::new(30), "");
//! assert!(validate_product(&chaat).is_ok());
//!
//! let free = Product::new("free", "Free Sample", "", Points::zero(), "");
//! assert!(validate_product(&free).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Order, Product};
use crate::{MAX_CATALOG_PRODUCTS, MAX_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier
// =============================================================================

fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a single catalog entry.
///
/// ## Rules
/// - `id` and `name` must not be empty
/// - `price` must be positive
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_id("product id", &product.id)?;

    if product.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product name".to_string(),
        });
    }

    if product.price.is_zero() {
        return Err(ValidationError::MustBePositive {
            field: format!("price of '{}'", product.id),
        });
    }

    Ok(())
}

/// Validates the whole catalog.
///
/// ## Rules
/// - At least one product, at most [`MAX_CATALOG_PRODUCTS`]
/// - Every product valid, ids unique
pub fn validate_catalog(products: &[Product]) -> ValidationResult<()> {
    if products.is_empty() {
        return Err(ValidationError::Required {
            field: "catalog".to_string(),
        });
    }

    if products.len() > MAX_CATALOG_PRODUCTS {
        return Err(ValidationError::TooMany {
            field: "catalog".to_string(),
            max: MAX_CATALOG_PRODUCTS,
        });
    }

    let mut seen = HashSet::new();
    for product in products {
        validate_product(product)?;
        if !seen.insert(product.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "product id".to_string(),
                value: product.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

/// Validates an order received from outside (import or another device).
///
/// Product prices are NOT checked against the current catalog: an order is a
/// record of what was charged at the time.
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    validate_id("order id", order.id())?;

    if order.items().is_empty() {
        return Err(ValidationError::Required {
            field: format!("items of order '{}'", order.id()),
        });
    }

    let mut seen = HashSet::new();
    for item in order.items() {
        validate_id("product id", item.product_id())?;

        if item.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of '{}' in order '{}'", item.product_id(), order.id()),
            });
        }

        if !seen.insert(item.product_id()) {
            return Err(ValidationError::Duplicate {
                field: format!("line in order '{}'", order.id()),
                value: item.product_id().to_string(),
            });
        }
    }

    let computed = order.computed_total();
    if computed != order.total_points() {
        return Err(ValidationError::Mismatch {
            field: format!("totalPoints of order '{}'", order.id()),
            expected: computed.value().to_string(),
            actual: order.total_points().value().to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
