//! # Database Error Types
//!
//! Error types for database operations and ledger calls.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError ← DbError (storage) or CoreError (domain rule)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation shows a human-readable message, no retry                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting duplicate SKU
    /// - Inserting duplicate category name
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (e.g. quantity would go negative).
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Rejected read input (search filter, report window, row limit).
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// Error returned by [`Ledger`](crate::Ledger) operations.
///
/// ## Taxonomy
/// ```text
/// LedgerError
/// ├── Core(CoreError)
/// │   ├── Validation        ← bad input, nothing written
/// │   ├── NotFound          ← product / category id unknown
/// │   ├── DuplicateSku      ← sku taken by another product
/// │   ├── DuplicateCategory ← category name taken
/// │   └── InsufficientStock ← requested vs available
/// └── Storage(DbError)      ← transaction rolled back
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl LedgerError {
    /// Returns the domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            LedgerError::Core(err) => Some(err),
            LedgerError::Storage(_) => None,
        }
    }

    /// Checks whether this is a storage failure rather than a rule violation.
    pub fn is_storage(&self) -> bool {
        matches!(self, LedgerError::Storage(_))
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Storage(DbError::from(err))
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{stocked_product, test_db};

    #[test]
    fn test_db_error_messages() {
        assert_eq!(
            DbError::not_found("Product", 42).to_string(),
            "Product not found: 42"
        );
        assert_eq!(
            DbError::duplicate("products.sku", "W1").to_string(),
            "Duplicate products.sku: 'W1' already exists"
        );

        let err: DbError = ValidationError::Required {
            field: "query".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Invalid input"));
    }

    #[test]
    fn test_ledger_error_conversions() {
        let err: LedgerError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(
            err.as_core(),
            Some(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(!err.is_storage());

        let err: LedgerError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LedgerError::Storage(DbError::PoolExhausted)));
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_constraint_failures_are_classified() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 100, 1).await;

        let insert = r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, created_at)
            VALUES (?1, 'IN', ?2, '2026-01-01T00:00:00Z')
        "#;

        let err = sqlx::query(insert)
            .bind(9_999_i64)
            .bind(1_i64)
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::ForeignKeyViolation { .. }));

        let err = sqlx::query(insert)
            .bind(widget.id)
            .bind(-1_i64)
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::CheckViolation { .. }));

        let err = sqlx::query("INSERT INTO categories (name) VALUES ('Electronics')")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(
            DbError::from(err),
            DbError::UniqueViolation { field, .. } if field == "categories.name"
        ));
    }
}
