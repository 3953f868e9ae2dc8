//! # Category Repository
//!
//! Lookup for product categories. Categories are created through
//! [`Ledger::create_category`](crate::Ledger::create_category) and never
//! deleted; six defaults are seeded by migration.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::Category;

/// Repository for category reads.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Gets a category by exact name (surrounding whitespace ignored).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = ?1")
                .bind(name.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_default_categories_seeded() {
        let db = test_db().await;

        let names: Vec<String> = db
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(
            names,
            vec![
                "Clothing",
                "Electronics",
                "Food & Beverages",
                "Furniture",
                "Other",
                "Stationery"
            ]
        );
    }

    #[tokio::test]
    async fn test_get_by_name_and_id() {
        let db = test_db().await;
        let repo = db.categories();

        let electronics = repo.get_by_name(" Electronics ").await.unwrap().unwrap();
        assert_eq!(electronics.name, "Electronics");

        let same = repo.get_by_id(electronics.id).await.unwrap().unwrap();
        assert_eq!(same, electronics);

        assert!(repo.get_by_name("Toys").await.unwrap().is_none());
        assert!(repo.get_by_id(9_999).await.unwrap().is_none());
    }
}
