//! # Repository Module
//!
//! Read-only queries over the Stockroom schema.
//!
//! ## Reads vs Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.products().low_stock()          db.ledger().record_sale(..)        │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  Repository (THIS MODULE)            Ledger                             │
//! │  ├── plain SELECTs on the pool       ├── BEGIN                          │
//! │  └── never writes                    ├── guarded UPDATE + audit INSERT  │
//! │                                      └── COMMIT                         │
//! │                                           │                             │
//! │            product::select_by_id ◄────────┘                             │
//! │            (generic over the executor, so the ledger can read           │
//! │             back inside its own transaction)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`] - Category listing and lookup
//! - [`ProductRepository`] - Product listing, search, low stock
//! - [`MovementRepository`] - Stock movement history
//! - [`SaleRepository`] - Sales by id and date range
//! - [`ReportRepository`] - Dashboard and chart aggregates
//!
//! [`CategoryRepository`]: category::CategoryRepository
//! [`ProductRepository`]: product::ProductRepository
//! [`MovementRepository`]: movement::MovementRepository
//! [`SaleRepository`]: sale::SaleRepository
//! [`ReportRepository`]: report::ReportRepository

pub mod category;
pub mod movement;
pub mod product;
pub mod report;
pub mod sale;
