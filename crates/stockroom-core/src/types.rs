//! # Domain Types
//!
//! Records exchanged between the ledger, the report queries and the
//! presentation layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │◄──│  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id, sku        │   │  IN / OUT       │       │
//! │  │  name (unique)  │   │  quantity       │   │  quantity > 0   │       │
//! │  └─────────────────┘   │  threshold      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                 ▲             ┌─────────────────┐       │
//! │                                 └─────────────│      Sale       │       │
//! │                                               │  ─────────────  │       │
//! │                                               │  price snapshot │       │
//! │                                               │  total          │       │
//! │                                               └─────────────────┘       │
//! │                                                                         │
//! │  Report rows: DailySales, ProductSales, CategoryRevenue,               │
//! │               ProductProfit, InventorySummary, StockReconciliation     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quantity Ownership
//! `Product::quantity` is owned by the ledger. [`ProductDraft`], the input
//! for creating and editing products, deliberately has no quantity field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name. Not unique.
    pub name: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    /// Weak reference to a category; `None` means uncategorized.
    pub category_id: Option<i64>,

    /// Category name resolved at read time.
    pub category_name: Option<String>,

    /// List price in cents.
    pub price_cents: i64,

    /// Purchase cost in cents (for profit calculations).
    pub cost_price_cents: i64,

    /// Units on hand. Only the ledger changes this.
    pub quantity: i64,

    /// Product is low on stock when `quantity <= low_stock_threshold`.
    pub low_stock_threshold: i64,

    pub description: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Checks whether the product sits at or below its threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Checks that `requested` units can leave stock.
    ///
    /// The ledger enforces the same rule inside its write transaction;
    /// this lets a form warn before submitting.
    pub fn ensure_available(&self, requested: i64) -> CoreResult<()> {
        if requested > self.quantity {
            return Err(CoreError::InsufficientStock {
                product_id: self.id,
                requested,
                available: self.quantity,
            });
        }
        Ok(())
    }
}

/// Input for creating or fully replacing a product.
///
/// ## No Quantity Field
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  Edit Product form                                                  │
/// │                                                                     │
/// │  name, sku, category, price, cost, threshold, description           │
/// │       │                                                             │
/// │       ▼                                                             │
/// │  Ledger::update_product(id, draft)   ← quantity untouched           │
/// │                                                                     │
/// │  Quantity changes only through stock-in / stock-out / sale, so      │
/// │  every change has an audit row.                                     │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub category_id: Option<i64>,
    pub price_cents: i64,
    pub cost_price_cents: i64,
    pub low_stock_threshold: i64,
    pub description: Option<String>,
}

impl ProductDraft {
    /// Creates a draft with no category, zero cost, default threshold and
    /// no description.
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: Money) -> Self {
        ProductDraft {
            name: name.into(),
            sku: sku.into(),
            category_id: None,
            price_cents: price.cents(),
            cost_price_cents: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            description: None,
        }
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn cost_price(mut self, cost: Money) -> Self {
        self.cost_price_cents = cost.cents();
        self
    }

    pub fn low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods removed for reasons other than a sale (damage, transfer, ...).
    Out,
}

impl MovementType {
    /// Returns the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record of a stock-in or stock-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub movement_type: MovementType,
    /// Always positive; the direction is in `movement_type`.
    pub quantity: i64,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Quantity with the sign of its effect on stock.
    pub fn signed_quantity(&self) -> i64 {
        match self.movement_type {
            MovementType::In => self.quantity,
            MovementType::Out => -self.quantity,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Append-only audit record of a sale.
///
/// ## Snapshot Pattern
/// `sale_price_cents` is copied at sale time. Later price edits on the
/// product do not rewrite sales history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity_sold: i64,
    pub sale_price_cents: i64,
    /// `quantity_sold × sale_price_cents`, fixed at sale time.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// Revenue and units sold on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub revenue_cents: i64,
    pub units: i64,
}

/// Sales totals per product name.
///
/// Grouping is by name, so two products sharing a name are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSales {
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Revenue per category; `None` collects uncategorized products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryRevenue {
    pub category_name: Option<String>,
    pub revenue_cents: i64,
}

impl CategoryRevenue {
    /// Bucket name for charts.
    pub fn label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Uncategorized")
    }
}

/// Revenue, cost and profit per product name.
///
/// Cost uses the product's current cost price, not a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductProfit {
    pub name: String,
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub profit_cents: i64,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub total_products: i64,
    /// Sum of `quantity` over all products.
    pub total_units: i64,
    pub low_stock_count: i64,
    pub total_revenue_cents: i64,
    pub total_sales: i64,
}

/// Stored quantity of a product next to the totals of its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockReconciliation {
    pub product_id: i64,
    pub stored_quantity: i64,
    pub units_in: i64,
    pub units_out: i64,
    pub units_sold: i64,
}

impl StockReconciliation {
    /// Quantity implied by the audit trail.
    pub fn derived_quantity(&self) -> i64 {
        self.units_in - self.units_out - self.units_sold
    }

    pub fn is_consistent(&self) -> bool {
        self.stored_quantity == self.derived_quantity()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(quantity: i64, threshold: i64) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "Widget".to_string(),
            sku: "W1".to_string(),
            category_id: None,
            category_name: None,
            price_cents: 10_000,
            cost_price_cents: 5_000,
            quantity,
            low_stock_threshold: threshold,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(widget(5, 10).is_low_stock());
        assert!(widget(10, 10).is_low_stock());
        assert!(!widget(11, 10).is_low_stock());
    }

    #[test]
    fn test_ensure_available() {
        let product = widget(15, 10);
        assert!(product.ensure_available(15).is_ok());

        match product.ensure_available(20) {
            Err(CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            }) => {
                assert_eq!(product_id, 1);
                assert_eq!(requested, 20);
                assert_eq!(available, 15);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_builder() {
        let draft = ProductDraft::new("Widget", "W1", Money::from_cents(10_000))
            .category(3)
            .cost_price(Money::from_cents(5_000))
            .low_stock_threshold(4)
            .description("blue");

        assert_eq!(draft.category_id, Some(3));
        assert_eq!(draft.cost_price_cents, 5_000);
        assert_eq!(draft.low_stock_threshold, 4);
        assert_eq!(draft.description.as_deref(), Some("blue"));

        let plain = ProductDraft::new("Gadget", "G1", Money::zero());
        assert_eq!(plain.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn test_movement_type_wire_format() {
        assert_eq!(serde_json::to_string(&MovementType::In).unwrap(), "\"IN\"");
        assert_eq!(serde_json::to_string(&MovementType::Out).unwrap(), "\"OUT\"");
        assert_eq!(MovementType::Out.to_string(), "OUT");
    }

    #[test]
    fn test_signed_quantity() {
        let movement = StockMovement {
            id: 1,
            product_id: 1,
            product_name: "Widget".to_string(),
            movement_type: MovementType::Out,
            quantity: 4,
            note: None,
            created_at: Utc::now(),
        };
        assert_eq!(movement.signed_quantity(), -4);
    }

    #[test]
    fn test_category_revenue_label() {
        let uncategorized = CategoryRevenue {
            category_name: None,
            revenue_cents: 100,
        };
        assert_eq!(uncategorized.label(), "Uncategorized");

        let named = CategoryRevenue {
            category_name: Some("Electronics".to_string()),
            revenue_cents: 100,
        };
        assert_eq!(named.label(), "Electronics");
    }

    #[test]
    fn test_reconciliation() {
        let rec = StockReconciliation {
            product_id: 1,
            stored_quantity: 15,
            units_in: 20,
            units_out: 0,
            units_sold: 5,
        };
        assert_eq!(rec.derived_quantity(), 15);
        assert!(rec.is_consistent());
    }
}
