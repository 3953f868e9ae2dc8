//! # Sale Repository
//!
//! Read operations for recorded sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── Ledger::record_sale() → Sale                                   │
//! │         (price snapshot + total fixed, quantity decremented, 1 tx)     │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── get_by_id() / in_range()                                       │
//! │     └── reports() aggregates                                           │
//! │                                                                         │
//! │  3. (ONLY WITH ITS PRODUCT) DELETE                                     │
//! │     └── Ledger::delete_product() removes the product's sales           │
//! │                                                                         │
//! │  Sales are never edited.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::Sale;

macro_rules! sale_select {
    () => {
        r#"
        SELECT
            s.id,
            s.product_id,
            p.name AS product_name,
            s.quantity_sold,
            s.sale_price_cents,
            s.total_cents,
            s.sale_date
        FROM sales s
        JOIN products p ON p.id = s.product_id
        "#
    };
}

/// Loads one sale by id on any executor.
pub(crate) async fn select_by_id<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Sale>(concat!(sale_select!(), "WHERE s.id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Repository for sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        Ok(select_by_id(&self.pool, id).await?)
    }

    /// Sales between two instants, newest first.
    ///
    /// Both bounds are inclusive and optional:
    /// ```text
    /// in_range(None,    None)   → every sale
    /// in_range(Some(a), None)   → sale_date >= a
    /// in_range(None,    Some(b))→ sale_date <= b
    /// in_range(Some(a), Some(b))→ a <= sale_date <= b  (empty when a > b)
    /// ```
    ///
    /// `julianday()` rounds to the millisecond, so SQLite only narrows the
    /// candidates with bounds widened by 1ms; the exact comparison runs on
    /// the decoded timestamps.
    pub async fn in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        debug!(start = ?start, end = ?end, "Loading sales in range");

        let slack = Duration::milliseconds(1);
        let coarse_start = start.map(|at| at.checked_sub_signed(slack).unwrap_or(at));
        let coarse_end = end.map(|at| at.checked_add_signed(slack).unwrap_or(at));

        let mut sales = sqlx::query_as::<_, Sale>(concat!(
            sale_select!(),
            r#"
            WHERE (?1 IS NULL OR julianday(s.sale_date) >= julianday(?1))
              AND (?2 IS NULL OR julianday(s.sale_date) <= julianday(?2))
            ORDER BY julianday(s.sale_date) DESC, s.id DESC
            "#
        ))
        .bind(coarse_start)
        .bind(coarse_end)
        .fetch_all(&self.pool)
        .await?;

        sales.retain(|sale| {
            start.map_or(true, |at| sale.sale_date >= at) && end.map_or(true, |at| sale.sale_date <= at)
        });

        debug!(count = sales.len(), "Sales loaded");
        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{backdate_sale, stocked_product, test_db};
    use chrono::{Duration, TimeZone};
    use stockroom_core::Money;

    #[tokio::test]
    async fn test_get_by_id() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 10_000, 20).await;
        let sale = db
            .ledger()
            .record_sale(widget.id, 5, Money::from_cents(10_000))
            .await
            .unwrap();

        let loaded = db.sales().get_by_id(sale.id).await.unwrap().unwrap();
        assert_eq!(loaded, sale);
        assert_eq!(loaded.product_name, "Widget");
        assert!(db.sales().get_by_id(sale.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_range_bounds_are_inclusive_and_optional() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 1_000, 50).await;
        let ledger = db.ledger();

        let now = Utc::now();
        let three_days_ago = now - Duration::days(3);
        let ten_days_ago = now - Duration::days(10);

        let old = ledger.record_sale(widget.id, 1, widget.price()).await.unwrap();
        let mid = ledger.record_sale(widget.id, 2, widget.price()).await.unwrap();
        let recent = ledger.record_sale(widget.id, 3, widget.price()).await.unwrap();
        backdate_sale(&db, old.id, ten_days_ago).await;
        backdate_sale(&db, mid.id, three_days_ago).await;

        let repo = db.sales();

        let all = repo.in_range(None, None).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![recent.id, mid.id, old.id]);

        // exact endpoints are included
        let window = repo
            .in_range(Some(ten_days_ago), Some(three_days_ago))
            .await
            .unwrap();
        let ids: Vec<i64> = window.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![mid.id, old.id]);

        let since = repo.in_range(Some(now - Duration::days(5)), None).await.unwrap();
        assert_eq!(since.len(), 2);

        let until = repo.in_range(None, Some(now - Duration::days(5))).await.unwrap();
        assert_eq!(until.len(), 1);
        assert_eq!(until[0].id, old.id);

        let inverted = repo
            .in_range(Some(three_days_ago), Some(ten_days_ago))
            .await
            .unwrap();
        assert!(inverted.is_empty());
    }

    #[tokio::test]
    async fn test_in_range_is_exact_below_a_millisecond() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 1_000, 5).await;
        let sale = db.ledger().record_sale(widget.id, 1, widget.price()).await.unwrap();

        let noon = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let sold_at = noon + Duration::microseconds(400);
        backdate_sale(&db, sale.id, sold_at).await;

        let repo = db.sales();
        let before = noon + Duration::microseconds(100);
        let after = noon + Duration::microseconds(700);

        assert!(repo.in_range(None, Some(before)).await.unwrap().is_empty());
        assert!(repo.in_range(Some(after), None).await.unwrap().is_empty());
        assert_eq!(repo.in_range(None, Some(sold_at)).await.unwrap().len(), 1);
        assert_eq!(repo.in_range(Some(sold_at), Some(sold_at)).await.unwrap().len(), 1);
        assert_eq!(repo.in_range(Some(before), Some(after)).await.unwrap().len(), 1);
    }
}
