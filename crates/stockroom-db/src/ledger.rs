//! # Inventory Ledger
//!
//! The only component that changes `products.quantity`. Every mutation
//! validates first, then runs as exactly one SQLite transaction that also
//! appends the audit row (stock movement or sale).
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(product 7, qty 5, price 100.00)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate (qty > 0, price >= 0, total fits i64)  ── Err ──► no write   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET quantity = quantity - 5                           │
//! │   WHERE id = 7 AND quantity >= 5          ◄── check + write, 1 stmt    │
//! │   RETURNING name                                                       │
//! │       │                                                                 │
//! │       ├── no row ──► SELECT quantity ──► NotFound / InsufficientStock  │
//! │       │                                  (tx dropped = ROLLBACK)       │
//! │       ▼                                                                 │
//! │  INSERT INTO sales (...)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quantity Invariant
//! ```text
//! products.quantity == Σ IN − Σ OUT − Σ quantity_sold
//! ```
//! A product's opening quantity is written as an IN movement noted
//! `"Opening stock"`, so the equality holds against a full recount.
//! [`Ledger::reconcile`] reports both sides.
//!
//! ## Concurrency
//! The availability check lives in the `WHERE` clause of the decrement, so
//! two callers racing for the last units cannot both succeed, whether they
//! share a pool or two processes share the file.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, LedgerError, LedgerResult};
use crate::pool::Database;
use crate::repository::product;
use stockroom_core::validation::{
    validate_category_name, validate_movement_quantity, validate_non_negative, validate_note,
    validate_product_draft,
};
use stockroom_core::{
    Category, CoreError, Money, MovementType, Product, ProductDraft, Sale, StockMovement,
    StockReconciliation, ValidationError, OPENING_STOCK_NOTE,
};

/// Transactional writer for products, stock and sales.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.ledger();
///
/// let widget = ledger.create_product(&draft, 20).await?;
/// ledger.record_sale(widget.id, 5, Money::from_cents(10_000)).await?;
///
/// match ledger.record_stock_out(widget.id, 20, Some("damaged")).await {
///     Err(LedgerError::Core(CoreError::InsufficientStock { available, .. })) => {
///         // available == 15
///     }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Creates a ledger writing through the given database's pool.
    pub fn new(db: &Database) -> Self {
        Ledger {
            pool: db.pool().clone(),
        }
    }

    // =========================================================================
    // Stock Movements
    // =========================================================================

    /// Receives goods: appends an IN movement and increments quantity.
    ///
    /// ## Errors
    /// * `Validation` - quantity not positive, note too long, or the new
    ///   quantity would not fit in an `i64`
    /// * `NotFound` - unknown product
    pub async fn record_stock_in(
        &self,
        product_id: i64,
        quantity: i64,
        note: Option<&str>,
    ) -> LedgerResult<StockMovement> {
        validate_movement_quantity(quantity)?;
        validate_note(note)?;
        let note = clean_note(note);

        debug!(product_id, quantity, "Recording stock in");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product_name: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity <= ?4
            RETURNING name
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .bind(i64::MAX - quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product_name) = product_name else {
            let on_hand: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let err: LedgerError = match on_hand {
                Some(on_hand) => {
                    warn!(product_id, quantity, on_hand, "Stock in rejected: quantity overflow");
                    ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 1,
                        max: i64::MAX - on_hand,
                    }
                    .into()
                }
                None => {
                    warn!(product_id, "Stock in rejected: product not found");
                    CoreError::product_not_found(product_id).into()
                }
            };
            return Err(err);
        };

        let movement = insert_movement(
            &mut tx,
            product_id,
            product_name,
            MovementType::In,
            quantity,
            note,
            now,
        )
        .await?;

        tx.commit().await?;

        info!(product_id, quantity, movement_id = movement.id, "Stock in recorded");
        Ok(movement)
    }

    /// Removes goods for a reason other than a sale (damage, transfer, ...).
    ///
    /// ## Errors
    /// * `Validation` - quantity not positive, note too long
    /// * `NotFound` - unknown product
    /// * `InsufficientStock` - fewer than `quantity` units on hand
    pub async fn record_stock_out(
        &self,
        product_id: i64,
        quantity: i64,
        note: Option<&str>,
    ) -> LedgerResult<StockMovement> {
        validate_movement_quantity(quantity)?;
        validate_note(note)?;
        let note = clean_note(note);

        debug!(product_id, quantity, "Recording stock out");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product_name = take_stock(&mut tx, product_id, quantity, now).await?;

        let movement = insert_movement(
            &mut tx,
            product_id,
            product_name,
            MovementType::Out,
            quantity,
            note,
            now,
        )
        .await?;

        tx.commit().await?;

        info!(product_id, quantity, movement_id = movement.id, "Stock out recorded");
        Ok(movement)
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Sells `quantity_sold` units at `sale_price` each.
    ///
    /// The unit price is stored as given (a snapshot; it need not equal the
    /// product's list price) and `total = quantity_sold × sale_price` is
    /// fixed now.
    ///
    /// ## Errors
    /// * `Validation` - bad quantity, negative price, total overflows
    /// * `NotFound` - unknown product
    /// * `InsufficientStock` - fewer than `quantity_sold` units on hand
    pub async fn record_sale(
        &self,
        product_id: i64,
        quantity_sold: i64,
        sale_price: Money,
    ) -> LedgerResult<Sale> {
        validate_movement_quantity(quantity_sold)?;
        validate_non_negative("sale price", sale_price.cents())?;
        let total = sale_price
            .checked_mul_quantity(quantity_sold)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        debug!(product_id, quantity_sold, price = %sale_price, "Recording sale");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product_name = take_stock(&mut tx, product_id, quantity_sold, now).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO sales (product_id, quantity_sold, sale_price_cents, total_cents, sale_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product_id)
        .bind(quantity_sold)
        .bind(sale_price.cents())
        .bind(total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!(
            product_id,
            quantity_sold,
            total = %total,
            sale_id = id,
            "Sale recorded"
        );

        Ok(Sale {
            id,
            product_id,
            product_name,
            quantity_sold,
            sale_price_cents: sale_price.cents(),
            total_cents: total.cents(),
            sale_date: now,
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product with `opening_quantity` units on hand.
    ///
    /// A non-zero opening quantity is recorded as an IN movement noted
    /// [`OPENING_STOCK_NOTE`] in the same transaction.
    ///
    /// ## Errors
    /// * `Validation` - empty name/SKU, negative price/cost/threshold/quantity
    /// * `NotFound` - `draft.category_id` does not exist
    /// * `DuplicateSku` - another product already uses the SKU
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
        opening_quantity: i64,
    ) -> LedgerResult<Product> {
        let draft = validate_product_draft(draft)?;
        validate_non_negative("opening quantity", opening_quantity)?;

        debug!(sku = %draft.sku, opening_quantity, "Creating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        ensure_category(&mut tx, draft.category_id).await?;
        ensure_sku_free(&mut tx, &draft.sku, None).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO products (
                name, sku, category_id, price_cents, cost_price_cents,
                quantity, low_stock_threshold, description, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.sku)
        .bind(draft.category_id)
        .bind(draft.price_cents)
        .bind(draft.cost_price_cents)
        .bind(opening_quantity)
        .bind(draft.low_stock_threshold)
        .bind(&draft.description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| on_unique(e, || CoreError::DuplicateSku { sku: draft.sku.clone() }))?
        .last_insert_rowid();

        if opening_quantity > 0 {
            insert_movement(
                &mut tx,
                id,
                draft.name.clone(),
                MovementType::In,
                opening_quantity,
                Some(OPENING_STOCK_NOTE),
                now,
            )
            .await?;
        }

        let product = reload_product(&mut tx, id).await?;

        tx.commit().await?;

        info!(product_id = id, sku = %product.sku, quantity = product.quantity, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product. Quantity is not part of
    /// the draft and is left untouched.
    ///
    /// ## Errors
    /// * `Validation` - same rules as creation
    /// * `NotFound` - unknown product or category
    /// * `DuplicateSku` - the SKU belongs to a different product
    pub async fn update_product(&self, product_id: i64, draft: &ProductDraft) -> LedgerResult<Product> {
        let draft = validate_product_draft(draft)?;

        debug!(product_id, sku = %draft.sku, "Updating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        ensure_category(&mut tx, draft.category_id).await?;
        ensure_sku_free(&mut tx, &draft.sku, Some(product_id)).await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                category_id = ?4,
                price_cents = ?5,
                cost_price_cents = ?6,
                low_stock_threshold = ?7,
                description = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(&draft.name)
        .bind(&draft.sku)
        .bind(draft.category_id)
        .bind(draft.price_cents)
        .bind(draft.cost_price_cents)
        .bind(draft.low_stock_threshold)
        .bind(&draft.description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| on_unique(e, || CoreError::DuplicateSku { sku: draft.sku.clone() }))?;

        if result.rows_affected() == 0 {
            warn!(product_id, "Update rejected: product not found");
            return Err(CoreError::product_not_found(product_id).into());
        }

        let product = reload_product(&mut tx, product_id).await?;

        tx.commit().await?;

        info!(product_id, sku = %product.sku, "Product updated");
        Ok(product)
    }

    /// Hard-deletes a product together with its sales and stock movements.
    ///
    /// ## Errors
    /// * `NotFound` - unknown (or already deleted) product
    pub async fn delete_product(&self, product_id: i64) -> LedgerResult<()> {
        debug!(product_id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let sales = sqlx::query("DELETE FROM sales WHERE product_id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let movements = sqlx::query("DELETE FROM stock_movements WHERE product_id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            warn!(product_id, "Delete rejected: product not found");
            return Err(CoreError::product_not_found(product_id).into());
        }

        tx.commit().await?;

        info!(product_id, sales, movements, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category.
    ///
    /// ## Errors
    /// * `Validation` - empty or overlong name
    /// * `DuplicateCategory` - name already exists
    pub async fn create_category(&self, name: &str) -> LedgerResult<Category> {
        validate_category_name(name)?;
        let name = name.trim();

        let id = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                on_unique(e, || CoreError::DuplicateCategory {
                    name: name.to_string(),
                })
            })?
            .last_insert_rowid();

        info!(category_id = id, name = %name, "Category created");

        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    // =========================================================================
    // Audit
    // =========================================================================

    /// Compares a product's stored quantity with its audit trail.
    ///
    /// ## Errors
    /// * `NotFound` - unknown product
    pub async fn reconcile(&self, product_id: i64) -> LedgerResult<StockReconciliation> {
        let reconciliation = sqlx::query_as::<_, StockReconciliation>(
            r#"
            SELECT
                p.id AS product_id,
                p.quantity AS stored_quantity,
                COALESCE((SELECT SUM(m.quantity) FROM stock_movements m
                          WHERE m.product_id = p.id AND m.movement_type = 'IN'), 0) AS units_in,
                COALESCE((SELECT SUM(m.quantity) FROM stock_movements m
                          WHERE m.product_id = p.id AND m.movement_type = 'OUT'), 0) AS units_out,
                COALESCE((SELECT SUM(s.quantity_sold) FROM sales s
                          WHERE s.product_id = p.id), 0) AS units_sold
            FROM products p
            WHERE p.id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::product_not_found(product_id))?;

        if !reconciliation.is_consistent() {
            warn!(
                product_id,
                stored = reconciliation.stored_quantity,
                derived = reconciliation.derived_quantity(),
                "Stored quantity disagrees with audit trail"
            );
        }

        Ok(reconciliation)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Guarded decrement shared by stock-out and sale; returns the product name.
///
/// Zero rows updated means either no such product or not enough units;
/// a follow-up read inside the same transaction tells which.
async fn take_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> LedgerResult<String> {
    let product_name: Option<String> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        RETURNING name
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(name) = product_name {
        return Ok(name);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        Some(available) => {
            warn!(product_id, requested = quantity, available, "Rejected: insufficient stock");
            Err(CoreError::InsufficientStock {
                product_id,
                requested: quantity,
                available,
            }
            .into())
        }
        None => {
            warn!(product_id, "Rejected: product not found");
            Err(CoreError::product_not_found(product_id).into())
        }
    }
}

async fn insert_movement(
    conn: &mut SqliteConnection,
    product_id: i64,
    product_name: String,
    movement_type: MovementType,
    quantity: i64,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> sqlx::Result<StockMovement> {
    let id = sqlx::query(
        r#"
        INSERT INTO stock_movements (product_id, movement_type, quantity, note, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(product_id)
    .bind(movement_type)
    .bind(quantity)
    .bind(note)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(StockMovement {
        id,
        product_id,
        product_name,
        movement_type,
        quantity,
        note: note.map(str::to_string),
        created_at: now,
    })
}

async fn ensure_category(conn: &mut SqliteConnection, category_id: Option<i64>) -> LedgerResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await?;

    if exists.is_none() {
        warn!(category_id, "Rejected: category not found");
        return Err(CoreError::category_not_found(category_id).into());
    }

    Ok(())
}

/// Fails with `DuplicateSku` if a product other than `owner` uses `sku`.
async fn ensure_sku_free(
    conn: &mut SqliteConnection,
    sku: &str,
    owner: Option<i64>,
) -> LedgerResult<()> {
    let holder: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE sku = ?1")
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;

    match holder {
        Some(holder) if Some(holder) != owner => {
            warn!(sku = %sku, holder, "Rejected: duplicate SKU");
            Err(CoreError::DuplicateSku {
                sku: sku.to_string(),
            }
            .into())
        }
        _ => Ok(()),
    }
}

async fn reload_product(conn: &mut SqliteConnection, product_id: i64) -> LedgerResult<Product> {
    product::select_by_id(&mut *conn, product_id)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id).into())
}

/// Maps a UNIQUE violation to the given domain error; other failures stay storage errors.
fn on_unique(err: sqlx::Error, duplicate: impl FnOnce() -> CoreError) -> LedgerError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => duplicate().into(),
        other => other.into(),
    }
}

/// Trims a note; blank notes are stored as NULL.
fn clean_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
