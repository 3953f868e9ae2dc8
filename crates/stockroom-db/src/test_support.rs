//! Shared fixtures for the crate's unit tests.

use chrono::{DateTime, Utc};
use stockroom_core::{Money, Product, ProductDraft};

use crate::pool::{Database, DbConfig};

/// Fresh, migrated, isolated in-memory database.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database should open")
}

/// Creates a product priced at `price_cents` with `quantity` opening units.
pub(crate) async fn stocked_product(
    db: &Database,
    name: &str,
    sku: &str,
    price_cents: i64,
    quantity: i64,
) -> Product {
    let draft = ProductDraft::new(name, sku, Money::from_cents(price_cents));
    db.ledger()
        .create_product(&draft, quantity)
        .await
        .expect("product should be created")
}

/// Moves a sale to `at`, for date-window tests.
pub(crate) async fn backdate_sale(db: &Database, sale_id: i64, at: DateTime<Utc>) {
    sqlx::query("UPDATE sales SET sale_date = ?1 WHERE id = ?2")
        .bind(at)
        .bind(sale_id)
        .execute(db.pool())
        .await
        .expect("sale should be backdated");
}
