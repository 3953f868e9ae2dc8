//! # stockroom-db: Database Layer for Stockroom
//!
//! This crate owns the SQLite store: the connection pool, the embedded
//! schema, the read repositories and the [`Ledger`], the only component
//! allowed to change a product's quantity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Presentation (forms, dashboard, charts)                               │
//! │       │                     │                                           │
//! │       │ mutations           │ reads                                     │
//! │       ▼                     ▼                                           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Ledger     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (ledger.rs)  │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ stock in/out  │    │ products      │    │ 001_schema   │  │   │
//! │  │   │ sales         │    │ movements     │    │ 002_default_ │  │   │
//! │  │   │ product CRUD  │    │ sales         │    │   categories │  │   │
//! │  │   │ 1 tx per op   │    │ reports       │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           └────────┬───────────┘                               │   │
//! │  │                    ▼                                           │   │
//! │  │             Database (pool.rs)                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (STOCKROOM_DB_PATH or platform data dir)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and ledger error types
//! - [`ledger`] - Transactional quantity-changing operations
//! - [`repository`] - Read-only queries and report aggregates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::{Money, ProductDraft};
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let draft = ProductDraft::new("Widget", "W1", Money::from_cents(10_000));
//! let widget = db.ledger().create_product(&draft, 20).await?;
//! db.ledger().record_sale(widget.id, 5, widget.price()).await?;
//!
//! let summary = db.reports().daily_sales_summary(30).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
