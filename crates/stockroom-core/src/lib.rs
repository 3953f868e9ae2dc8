//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! This crate holds the inventory domain as pure types and functions with
//! zero I/O dependencies. Everything that touches SQLite lives in
//! `stockroom-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Presentation (pages, charts, CSV export)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         stockroom-db (Ledger, repositories, reports)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │           │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, StockMovement, Sale, report rows)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(10_000); // 100.00
//! let total = price.checked_mul_quantity(5).unwrap();
//! assert_eq!(total.cents(), 50_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock threshold applied when a product form leaves it untouched.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Trailing window of the dashboard sales chart, in days.
pub const DEFAULT_SUMMARY_WINDOW_DAYS: u32 = 30;

/// Number of rows shown by the top-products and profit charts.
pub const DEFAULT_TOP_PRODUCTS_LIMIT: u32 = 10;

/// Note attached to the IN movement that records a product's opening quantity.
pub const OPENING_STOCK_NOTE: &str = "Opening stock";
