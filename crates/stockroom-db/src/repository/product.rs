//! # Product Repository
//!
//! Read operations for products.
//!
//! ## Key Operations
//! - Substring search over name, SKU and category name
//! - Low-stock listing
//! - Lookup by id / SKU
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Product Search Works                             │
//! │                                                                         │
//! │  User types: "50%"                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  escape_like("50%") → "50\%"    (% and _ lose their wildcard meaning) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  p.name LIKE '%50\%%' ESCAPE '\'                                       │
//! │    OR p.sku  LIKE ...                                                   │
//! │    OR c.name LIKE ...            (ASCII case-insensitive)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  "Sale 50% off"  ← MATCH        "Sale 500 units" ← no match            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::validation::validate_search_query;
use stockroom_core::Product;

/// Product columns plus the joined category name.
///
/// Expands to a string literal so queries can be built with `concat!`.
macro_rules! product_select {
    () => {
        r#"
        SELECT
            p.id,
            p.name,
            p.sku,
            p.category_id,
            c.name AS category_name,
            p.price_cents,
            p.cost_price_cents,
            p.quantity,
            p.low_stock_threshold,
            p.description,
            p.created_at,
            p.updated_at
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        "#
    };
}

/// Loads one product by id on any executor (pool or open transaction).
pub(crate) async fn select_by_id<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Product>(concat!(product_select!(), "WHERE p.id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Escapes `\`, `%` and `_` for use inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for product reads.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.list(Some("widget")).await?;
/// let product = repo.get_by_sku("W1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name, optionally filtered.
    ///
    /// ## Arguments
    /// * `filter` - Case-insensitive substring matched against product
    ///   name, SKU or category name. `None` or blank lists everything.
    pub async fn list(&self, filter: Option<&str>) -> DbResult<Vec<Product>> {
        let term = validate_search_query(filter.unwrap_or(""))?;

        debug!(filter = %term, "Listing products");

        let products = if term.is_empty() {
            sqlx::query_as::<_, Product>(concat!(product_select!(), "ORDER BY p.name, p.id"))
                .fetch_all(&self.pool)
                .await?
        } else {
            let pattern = format!("%{}%", escape_like(&term));
            sqlx::query_as::<_, Product>(concat!(
                product_select!(),
                r#"
                WHERE p.name LIKE ?1 ESCAPE '\'
                   OR p.sku LIKE ?1 ESCAPE '\'
                   OR c.name LIKE ?1 ESCAPE '\'
                ORDER BY p.name, p.id
                "#
            ))
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists products at or below their low-stock threshold, emptiest first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(concat!(
            product_select!(),
            "WHERE p.quantity <= p.low_stock_threshold ORDER BY p.quantity ASC, p.name, p.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Low stock products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        Ok(select_by_id(&self.pool, id).await?)
    }

    /// Gets a product by its SKU (e.g. "ELEC-0001").
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(product_select!(), "WHERE p.sku = ?1"))
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::test_support::{stocked_product, test_db};
    use stockroom_core::{Money, ProductDraft};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("widget"), "widget");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let db = test_db().await;
        stocked_product(&db, "Gadget", "G1", 500, 1).await;
        stocked_product(&db, "Anvil", "A1", 500, 1).await;
        stocked_product(&db, "Widget", "W1", 500, 1).await;

        let names: Vec<String> = db
            .products()
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Anvil", "Gadget", "Widget"]);
    }

    #[tokio::test]
    async fn test_list_filter_matches_name_sku_and_category() {
        let db = test_db().await;
        let electronics = db
            .categories()
            .get_by_name("Electronics")
            .await
            .unwrap()
            .unwrap();

        let draft = ProductDraft::new("Cable", "CAB-1", Money::from_cents(300)).category(electronics.id);
        db.ledger().create_product(&draft, 0).await.unwrap();
        stocked_product(&db, "Blue Widget", "W1", 500, 1).await;
        stocked_product(&db, "Lamp", "XWIDGET-9", 500, 1).await;

        let repo = db.products();

        let by_name = repo.list(Some("widget")).await.unwrap();
        let names: Vec<&str> = by_name.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Blue Widget", "Lamp"]);

        let by_category = repo.list(Some("ELECTRON")).await.unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].category_name.as_deref(), Some("Electronics"));

        assert_eq!(repo.list(Some("   ")).await.unwrap().len(), 3);
        assert!(repo.list(Some("nothing-like-this")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filter_escapes_wildcards() {
        let db = test_db().await;
        stocked_product(&db, "Sale 50% off", "S1", 100, 1).await;
        stocked_product(&db, "Sale 500 units", "S2", 100, 1).await;
        stocked_product(&db, "snake_case mug", "S3", 100, 1).await;
        stocked_product(&db, "snakeXcase mug", "S4", 100, 1).await;

        let repo = db.products();

        let percent = repo.list(Some("50%")).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].sku, "S1");

        let underscore = repo.list(Some("snake_case")).await.unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].sku, "S3");
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_filter() {
        let db = test_db().await;

        let long = "x".repeat(101);
        let result = db.products().list(Some(&long)).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_low_stock_ordered_by_quantity() {
        let db = test_db().await;
        let draft = |name: &str, sku: &str, threshold| {
            ProductDraft::new(name, sku, Money::from_cents(100)).low_stock_threshold(threshold)
        };

        let ledger = db.ledger();
        ledger.create_product(&draft("A", "A1", 10), 5).await.unwrap();
        ledger.create_product(&draft("B", "B1", 10), 50).await.unwrap();
        ledger.create_product(&draft("C", "C1", 3), 3).await.unwrap();
        ledger.create_product(&draft("D", "D1", 0), 0).await.unwrap();

        let low: Vec<String> = db
            .products()
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.sku)
            .collect();

        // threshold is inclusive: C (3 <= 3) and D (0 <= 0) are both low
        assert_eq!(low, vec!["D1", "C1", "A1"]);
    }

    #[tokio::test]
    async fn test_get_by_id_sku_and_count() {
        let db = test_db().await;
        let widget = stocked_product(&db, "Widget", "W1", 10_000, 20).await;

        let repo = db.products();
        assert_eq!(repo.get_by_id(widget.id).await.unwrap(), Some(widget.clone()));
        assert_eq!(repo.get_by_sku("W1").await.unwrap(), Some(widget));
        assert!(repo.get_by_id(404).await.unwrap().is_none());
        assert!(repo.get_by_sku("NOPE").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
