//! # Validation Module
//!
//! Input validation for ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                 │
//! │  └── Spin boxes, required fields, immediate feedback                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Ledger (Rust)                                                │
//! │  └── THIS MODULE: checked before any write is issued                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (sku, category name)                                       │
//! │  ├── CHECK (quantity >= 0, amounts >= 0)                               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_sku, validate_movement_quantity};
//!
//! validate_sku("W1").unwrap();
//! validate_movement_quantity(5).unwrap();
//! assert!(validate_movement_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::ProductDraft;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_NOTE_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Any other text is accepted; uniqueness is left to the ledger
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_sku;
///
/// assert!(validate_sku("ELEC-0001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("SKU/001").is_ok());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN)
}

/// Validates a category name: non-empty, at most 100 characters.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_required_text("category", name, MAX_CATEGORY_LEN)
}

/// Validates an optional movement note.
pub fn validate_note(note: Option<&str>) -> ValidationResult<()> {
    match note {
        Some(note) if note.chars().count() > MAX_NOTE_LEN => Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a search filter and returns it trimmed.
///
/// An empty filter is valid and means "all products".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a stock movement or sale.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_movement_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a value that may be zero but not negative.
///
/// Used for prices, cost prices, opening quantities and thresholds.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", 0).is_ok());
/// assert!(validate_non_negative("price", -100).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a report window or row limit (1..=max).
pub fn validate_report_bound(field: &str, value: u32, max: u32) -> ValidationResult<()> {
    if value == 0 || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: max as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Product Draft
// =============================================================================

/// Validates a product draft and returns it normalized.
///
/// ## Normalization
/// - name, sku and description are trimmed
/// - an empty description becomes `None`
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<ProductDraft> {
    validate_product_name(&draft.name)?;
    validate_sku(&draft.sku)?;
    validate_non_negative("price", draft.price_cents)?;
    validate_non_negative("cost price", draft.cost_price_cents)?;
    validate_non_negative("low stock threshold", draft.low_stock_threshold)?;

    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    if let Some(d) = &description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
    }

    Ok(ProductDraft {
        name: draft.name.trim().to_string(),
        sku: draft.sku.trim().to_string(),
        category_id: draft.category_id,
        price_cents: draft.price_cents,
        cost_price_cents: draft.cost_price_cents,
        low_stock_threshold: draft.low_stock_threshold,
        description,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
