//! # Movement Repository
//!
//! Stock movement history. Rows are appended by the ledger and never
//! updated; they disappear only when their product is deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::StockMovement;

macro_rules! movement_select {
    () => {
        r#"
        SELECT
            m.id,
            m.product_id,
            p.name AS product_name,
            m.movement_type,
            m.quantity,
            m.note,
            m.created_at
        FROM stock_movements m
        JOIN products p ON p.id = m.product_id
        "#
    };
}

/// Repository for stock movement reads.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Movement history, newest first.
    ///
    /// ## Arguments
    /// * `product_id` - Restrict to one product; `None` for all products.
    pub async fn history(&self, product_id: Option<i64>) -> DbResult<Vec<StockMovement>> {
        debug!(product_id = ?product_id, "Loading movement history");

        let movements = sqlx::query_as::<_, StockMovement>(concat!(
            movement_select!(),
            r#"
            WHERE (?1 IS NULL OR m.product_id = ?1)
            ORDER BY julianday(m.created_at) DESC, m.id DESC
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = movements.len(), "Movement history loaded");
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{stocked_product, test_db};
    use stockroom_core::{MovementType, OPENING_STOCK_NOTE};

    #[tokio::test]
    async fn test_history_newest_first_and_filtered() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 1_000, 10).await;
        let gadget = stocked_product(&db, "Gadget", "G1", 1_000, 0).await;

        let ledger = db.ledger();
        ledger.record_stock_in(gadget.id, 4, Some("delivery")).await.unwrap();
        ledger.record_stock_out(widget.id, 2, Some("damaged")).await.unwrap();

        let all = db.movements().history(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].note.as_deref(), Some("damaged"));
        assert_eq!(all[2].note.as_deref(), Some(OPENING_STOCK_NOTE));

        let widget_only = db.movements().history(Some(widget.id)).await.unwrap();
        assert_eq!(widget_only.len(), 2);
        assert!(widget_only.iter().all(|m| m.product_name == "Widget"));
        assert_eq!(widget_only[0].movement_type, MovementType::Out);
        assert_eq!(widget_only[1].movement_type, MovementType::In);
        assert_eq!(widget_only[1].quantity, 10);
    }

    #[tokio::test]
    async fn test_history_empty() {
        let db = test_db().await;
        assert!(db.movements().history(None).await.unwrap().is_empty());
        assert!(db.movements().history(Some(1)).await.unwrap().is_empty());
    }
}
