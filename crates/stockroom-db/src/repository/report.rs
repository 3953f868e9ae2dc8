//! # Report Repository
//!
//! Read-only aggregates behind the dashboard and the report charts.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report                    Grouping            Order                    │
//! │  ───────────────────────   ─────────────────   ───────────────────────  │
//! │  daily_sales_summary(n)    DATE(sale_date)     day ascending            │
//! │  top_products(k)           product name        revenue descending       │
//! │  category_revenue()        category            revenue descending       │
//! │  profit_by_product(k)      product name        profit descending        │
//! │  inventory_summary()       (whole store)       -                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Grouping By Name
//! `top_products` and `profit_by_product` group by product **name**, so two
//! products sharing a name show up as one row. Sales of deleted products
//! are gone with them and never appear here.
//!
//! ## Days
//! Days are UTC calendar days. Days without sales are omitted, not
//! zero-filled; charting fills gaps if it wants them.

use chrono::{Duration, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::validation::validate_report_bound;
use stockroom_core::{CategoryRevenue, DailySales, InventorySummary, ProductProfit, ProductSales};

/// Longest accepted summary window (about ten years).
pub const MAX_WINDOW_DAYS: u32 = 3_650;

/// Largest accepted row limit for ranked reports.
pub const MAX_REPORT_ROWS: u32 = 1_000;

/// Repository for report aggregates.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Revenue and units per UTC day, from midnight `window_days` ago
    /// through now, oldest day first.
    ///
    /// ## Window
    /// ```text
    /// window_days = 2, today = 2024-05-10 (any time)
    ///
    ///   2024-05-08 00:00 UTC ──────────────────────────► now
    ///   │  05-08       │  05-09       │  05-10 (so far) │
    ///   └──────────────┴──────────────┴─────────────────┘
    ///   up to 3 rows: one per day that had sales
    /// ```
    pub async fn daily_sales_summary(&self, window_days: u32) -> DbResult<Vec<DailySales>> {
        validate_report_bound("window_days", window_days, MAX_WINDOW_DAYS)?;

        let start_day = Utc::now().date_naive() - Duration::days(i64::from(window_days));
        let since = start_day.and_time(NaiveTime::MIN).and_utc();

        debug!(window_days, since = %since, "Daily sales summary");

        let days = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT
                DATE(sale_date) AS day,
                COALESCE(SUM(total_cents), 0) AS revenue_cents,
                COALESCE(SUM(quantity_sold), 0) AS units
            FROM sales
            WHERE julianday(sale_date) >= julianday(?1)
            GROUP BY DATE(sale_date)
            ORDER BY day ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    /// Best sellers by revenue, at most `limit` rows.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<ProductSales>> {
        validate_report_bound("limit", limit, MAX_REPORT_ROWS)?;

        debug!(limit, "Top products");

        let rows = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT
                p.name AS name,
                COALESCE(SUM(s.quantity_sold), 0) AS units_sold,
                COALESCE(SUM(s.total_cents), 0) AS revenue_cents
            FROM sales s
            JOIN products p ON p.id = s.product_id
            GROUP BY p.name
            ORDER BY revenue_cents DESC, p.name ASC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue per category; uncategorized sales form one `None` bucket.
    pub async fn category_revenue(&self) -> DbResult<Vec<CategoryRevenue>> {
        debug!("Category revenue");

        let rows = sqlx::query_as::<_, CategoryRevenue>(
            r#"
            SELECT
                c.name AS category_name,
                COALESCE(SUM(s.total_cents), 0) AS revenue_cents
            FROM sales s
            JOIN products p ON p.id = s.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            GROUP BY c.id
            ORDER BY revenue_cents DESC, category_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue, cost and profit per product name, most profitable first.
    ///
    /// Cost is `quantity_sold × current cost price`; editing a product's
    /// cost price changes the cost of its past sales in this report.
    pub async fn profit_by_product(&self, limit: u32) -> DbResult<Vec<ProductProfit>> {
        validate_report_bound("limit", limit, MAX_REPORT_ROWS)?;

        debug!(limit, "Profit by product");

        let rows = sqlx::query_as::<_, ProductProfit>(
            r#"
            SELECT
                p.name AS name,
                COALESCE(SUM(s.total_cents), 0) AS revenue_cents,
                COALESCE(SUM(s.quantity_sold * p.cost_price_cents), 0) AS cost_cents,
                COALESCE(SUM(s.total_cents - s.quantity_sold * p.cost_price_cents), 0)
                    AS profit_cents
            FROM sales s
            JOIN products p ON p.id = s.product_id
            GROUP BY p.name
            ORDER BY profit_cents DESC, p.name ASC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Headline numbers for the dashboard cards.
    pub async fn inventory_summary(&self) -> DbResult<InventorySummary> {
        let (total_products, total_units, low_stock_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(quantity), 0),
                COALESCE(SUM(CASE WHEN quantity <= low_stock_threshold THEN 1 ELSE 0 END), 0)
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (total_sales, total_revenue_cents): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM sales")
                .fetch_one(&self.pool)
                .await?;

        let summary = InventorySummary {
            total_products,
            total_units,
            low_stock_count,
            total_revenue_cents,
            total_sales,
        };

        debug!(?summary, "Inventory summary");
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::test_support::{backdate_sale, stocked_product, test_db};
    use stockroom_core::{
        Money, ProductDraft, DEFAULT_SUMMARY_WINDOW_DAYS, DEFAULT_TOP_PRODUCTS_LIMIT,
    };

    #[tokio::test]
    async fn test_daily_summary_empty_store() {
        let db = test_db().await;

        let reports = db.reports();
        assert!(reports
            .daily_sales_summary(DEFAULT_SUMMARY_WINDOW_DAYS)
            .await
            .unwrap()
            .is_empty());
        assert!(reports
            .top_products(DEFAULT_TOP_PRODUCTS_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_daily_summary_groups_by_day_within_window() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 1_000, 100).await;
        let ledger = db.ledger();

        let today = Utc::now();
        let two_days_ago = today - Duration::days(2);
        let long_ago = today - Duration::days(45);

        ledger.record_sale(widget.id, 1, widget.price()).await.unwrap();
        ledger.record_sale(widget.id, 2, widget.price()).await.unwrap();
        let older = ledger.record_sale(widget.id, 3, widget.price()).await.unwrap();
        let ancient = ledger.record_sale(widget.id, 4, widget.price()).await.unwrap();
        backdate_sale(&db, older.id, two_days_ago).await;
        backdate_sale(&db, ancient.id, long_ago).await;

        let days = db
            .reports()
            .daily_sales_summary(DEFAULT_SUMMARY_WINDOW_DAYS)
            .await
            .unwrap();

        assert_eq!(
            days,
            vec![
                DailySales {
                    day: two_days_ago.date_naive(),
                    revenue_cents: 3_000,
                    units: 3,
                },
                DailySales {
                    day: today.date_naive(),
                    revenue_cents: 3_000,
                    units: 3,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_daily_summary_window_starts_at_midnight() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 1_000, 10).await;

        let sale = db
            .ledger()
            .record_sale(widget.id, 1, widget.price())
            .await
            .unwrap();

        // first second of the day `window_days` back is inside the window
        let start_day = Utc::now().date_naive() - Duration::days(7);
        let midnight = start_day.and_time(NaiveTime::MIN).and_utc();
        backdate_sale(&db, sale.id, midnight + Duration::seconds(1)).await;

        let days = db.reports().daily_sales_summary(7).await.unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].day, start_day);

        backdate_sale(&db, sale.id, midnight - Duration::seconds(1)).await;
        assert!(db.reports().daily_sales_summary(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_bounds_rejected() {
        let db = test_db().await;
        let reports = db.reports();

        assert!(matches!(
            reports.daily_sales_summary(0).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            reports.top_products(MAX_REPORT_ROWS + 1).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            reports.profit_by_product(0).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_top_products_merges_same_name_and_truncates() {
        let db = test_db().await;
        let ledger = db.ledger();

        let blue = stocked_product(&db, "Mug", "MUG-BLUE", 500, 50).await;
        let red = stocked_product(&db, "Mug", "MUG-RED", 700, 50).await;
        let lamp = stocked_product(&db, "Lamp", "LAMP-1", 4_000, 50).await;
        let pen = stocked_product(&db, "Pen", "PEN-1", 100, 50).await;

        ledger.record_sale(blue.id, 2, blue.price()).await.unwrap(); // 1000
        ledger.record_sale(red.id, 1, red.price()).await.unwrap(); // 700
        ledger.record_sale(lamp.id, 1, lamp.price()).await.unwrap(); // 4000
        ledger.record_sale(pen.id, 3, pen.price()).await.unwrap(); // 300

        let top = db.reports().top_products(2).await.unwrap();
        assert_eq!(
            top,
            vec![
                ProductSales {
                    name: "Lamp".to_string(),
                    units_sold: 1,
                    revenue_cents: 4_000,
                },
                ProductSales {
                    name: "Mug".to_string(),
                    units_sold: 3,
                    revenue_cents: 1_700,
                },
            ]
        );

        assert_eq!(db.reports().top_products(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_category_revenue_with_uncategorized_bucket() {
        let db = test_db().await;
        let ledger = db.ledger();
        let categories = db.categories();

        let electronics = categories.get_by_name("Electronics").await.unwrap().unwrap();
        let clothing = categories.get_by_name("Clothing").await.unwrap().unwrap();

        let cable = ledger
            .create_product(
                &ProductDraft::new("Cable", "CAB-1", Money::from_cents(1_000)).category(electronics.id),
                10,
            )
            .await
            .unwrap();
        let shirt = ledger
            .create_product(
                &ProductDraft::new("Shirt", "SH-1", Money::from_cents(2_500)).category(clothing.id),
                10,
            )
            .await
            .unwrap();
        let loose = stocked_product(&db, "Loose", "L-1", 300, 10).await;

        ledger.record_sale(cable.id, 2, cable.price()).await.unwrap(); // 2000
        ledger.record_sale(shirt.id, 2, shirt.price()).await.unwrap(); // 5000
        ledger.record_sale(loose.id, 1, loose.price()).await.unwrap(); // 300

        let rows = db.reports().category_revenue().await.unwrap();
        let labelled: Vec<(&str, i64)> = rows.iter().map(|r| (r.label(), r.revenue_cents)).collect();

        assert_eq!(
            labelled,
            vec![("Clothing", 5_000), ("Electronics", 2_000), ("Uncategorized", 300)]
        );
        assert_eq!(rows[2].category_name, None);
    }

    #[tokio::test]
    async fn test_profit_uses_current_cost_price() {
        let db = test_db().await;
        let ledger = db.ledger();

        let draft = ProductDraft::new("Widget", "W1", Money::from_cents(1_000))
            .cost_price(Money::from_cents(600));
        let widget = ledger.create_product(&draft, 10).await.unwrap();
        ledger.record_sale(widget.id, 2, widget.price()).await.unwrap();

        let before = db.reports().profit_by_product(10).await.unwrap();
        assert_eq!(
            before,
            vec![ProductProfit {
                name: "Widget".to_string(),
                revenue_cents: 2_000,
                cost_cents: 1_200,
                profit_cents: 800,
            }]
        );

        ledger
            .update_product(widget.id, &draft.clone().cost_price(Money::from_cents(1_100)))
            .await
            .unwrap();

        let after = db.reports().profit_by_product(10).await.unwrap();
        assert_eq!(after[0].cost_cents, 2_200);
        assert_eq!(after[0].profit_cents, -200);
    }

    #[tokio::test]
    async fn test_inventory_summary() {
        let db = test_db().await;

        assert_eq!(
            db.reports().inventory_summary().await.unwrap(),
            InventorySummary::default()
        );

        let a = stocked_product(&db, "A", "A1", 1_000, 5).await;
        stocked_product(&db, "B", "B1", 1_000, 50).await;
        db.ledger().record_sale(a.id, 2, a.price()).await.unwrap();

        let summary = db.reports().inventory_summary().await.unwrap();
        assert_eq!(
            summary,
            InventorySummary {
                total_products: 2,
                total_units: 53,
                low_stock_count: 1,
                total_revenue_cents: 2_000,
                total_sales: 1,
            }
        );
    }
}
