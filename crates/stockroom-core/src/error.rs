//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  ├── DbError          - Storage failures                               │
//! │  └── LedgerError      - CoreError | DbError, returned by the Ledger    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → Presentation        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations raised by inventory operations.
///
/// Every variant is a logic error: retrying the same call yields the
/// same failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Another product already uses this SKU.
    #[error("Duplicate SKU: '{sku}' already exists")]
    DuplicateSku { sku: String },

    /// Another category already uses this name.
    #[error("Duplicate category: '{name}' already exists")]
    DuplicateCategory { name: String },

    /// Stock-out or sale asks for more units than are on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 20)
    ///      │
    ///      ▼
    /// Guarded decrement: available=15
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, requested: 20, available: 15 }
    ///      │
    ///      ▼
    /// UI shows: "Only 15 units available in stock."
    /// ```
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a product.
    pub fn product_not_found(id: i64) -> Self {
        CoreError::NotFound {
            entity: "Product",
            id,
        }
    }

    /// Creates a NotFound error for a category.
    pub fn category_not_found(id: i64) -> Self {
        CoreError::NotFound {
            entity: "Category",
            id,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write is issued, so a validation failure never
/// leaves partial state behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., malformed SKU or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
        let err = CoreError::InsufficientStock {
            product_id: 7,
            requested: 20,
            available: 15,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 15, requested 20"
        );

        let err = CoreError::DuplicateSku {
            sku: "W1".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate SKU: 'W1' already exists");

        assert_eq!(
            CoreError::product_not_found(42).to_string(),
            "Product not found: 42"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
