//! # Seed Data Generator
//!
//! Populates the database with demo products, stock movements and sales.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default) in the default database
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Data
//! Everything goes through the ledger, so the audit trail is complete:
//! - Products spread over the default categories, with opening stock
//! - A supplier delivery (IN) per product, occasional damage write-offs (OUT)
//! - A few sales per product, spread over the last 30 days
//!
//! Numbers are derived from the product index, so two runs produce the
//! same data.

use chrono::{Duration, Utc};
use std::env;
use stockroom_core::{
    CoreError, Money, ProductDraft, DEFAULT_SUMMARY_WINDOW_DAYS, DEFAULT_TOP_PRODUCTS_LIMIT,
};
use stockroom_db::{Database, DbConfig, LedgerError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Product names per default category, with the SKU prefix for each.
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Electronics",
        "ELEC",
        &[
            "USB-C Cable",
            "Wireless Mouse",
            "Keyboard",
            "Headphones",
            "Power Bank",
            "HDMI Adapter",
            "Webcam",
            "Desk Lamp LED",
        ],
    ),
    (
        "Clothing",
        "CLO",
        &[
            "T-Shirt",
            "Hoodie",
            "Baseball Cap",
            "Wool Socks",
            "Rain Jacket",
            "Scarf",
        ],
    ),
    (
        "Food & Beverages",
        "FNB",
        &[
            "Ground Coffee",
            "Green Tea",
            "Mineral Water",
            "Dark Chocolate",
            "Granola Bar",
            "Orange Juice",
            "Sparkling Water",
        ],
    ),
    (
        "Stationery",
        "STA",
        &[
            "Notebook A5",
            "Ballpoint Pen",
            "Sticky Notes",
            "Highlighter",
            "Stapler",
            "Paper Clips",
        ],
    ),
    (
        "Furniture",
        "FUR",
        &["Office Chair", "Standing Desk", "Bookshelf", "Filing Cabinet"],
    ),
    ("Other", "OTH", &["Gift Card", "Umbrella", "Water Bottle"]),
];

const DEFAULT_COUNT: usize = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKROOM_DB_PATH or data dir)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let config = match db_path {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_env()?,
    };

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database_path.display());
    println!("Products: {}", count);
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut sales = 0;

    let entries: Vec<(&str, &str, &str)> = CATALOG
        .iter()
        .flat_map(|(category, prefix, names)| {
            names.iter().map(move |name| (*category, *prefix, *name))
        })
        .collect();

    for seed in 0..count {
        let (category_name, prefix, base_name) = entries[seed % entries.len()];

        // past the end of the catalog, names repeat as new editions
        let edition = seed / entries.len();
        let name = if edition == 0 {
            base_name.to_string()
        } else {
            format!("{} v{}", base_name, edition + 1)
        };

        sales += seed_product(&db, category_name, prefix, &name, seed).await?;
        generated += 1;

        if generated % 25 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products and {} sales in {:?}", generated, sales, elapsed);

    let summary = db.reports().inventory_summary().await?;
    println!();
    println!("Dashboard:");
    println!("  Products:        {}", summary.total_products);
    println!("  Units on hand:   {}", summary.total_units);
    println!("  Low stock:       {}", summary.low_stock_count);
    println!("  Sales:           {}", summary.total_sales);
    println!("  Revenue:         {}", Money::from_cents(summary.total_revenue_cents));

    let reports = db.reports();
    let days = reports.daily_sales_summary(DEFAULT_SUMMARY_WINDOW_DAYS).await?;
    println!(
        "  Selling days:    {} in the last {}",
        days.len(),
        DEFAULT_SUMMARY_WINDOW_DAYS
    );

    println!();
    println!("Top products:");
    for row in reports.top_products(DEFAULT_TOP_PRODUCTS_LIMIT).await? {
        println!(
            "  {:<24} {:>6} units  {:>12}",
            row.name,
            row.units_sold,
            Money::from_cents(row.revenue_cents).to_string()
        );
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Creates one product with its movements and sales; returns the number of sales.
async fn seed_product(
    db: &Database,
    category_name: &str,
    prefix: &str,
    name: &str,
    seed: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let ledger = db.ledger();
    let category = db.categories().get_by_name(category_name).await?;

    // price 2.99 .. 97.99, cost 55-79% of price
    let price_cents = 299 + ((seed * 1_913) % 9_500) as i64;
    let cost_pct = 55 + (seed % 25) as i64;
    let opening = (seed % 40) as i64;

    let sku = format!("{}-{:04}", prefix, seed + 1);
    let mut draft = ProductDraft::new(name, sku, Money::from_cents(price_cents))
        .cost_price(Money::from_cents(price_cents * cost_pct / 100))
        .low_stock_threshold(5 + (seed % 4) as i64 * 5);
    if let Some(category) = category {
        draft = draft.category(category.id);
    }

    let product = ledger.create_product(&draft, opening).await?;

    if seed % 3 != 0 {
        let delivered = 5 + (seed % 25) as i64;
        ledger
            .record_stock_in(product.id, delivered, Some("Supplier delivery"))
            .await?;
    }

    if seed % 7 == 0 {
        match ledger
            .record_stock_out(product.id, 1, Some("Damaged in storage"))
            .await
        {
            Ok(_) | Err(LedgerError::Core(CoreError::InsufficientStock { .. })) => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut recorded = 0;
    for n in 0..(seed % 5) {
        let quantity = 1 + ((seed + n) % 3) as i64;
        match ledger.record_sale(product.id, quantity, product.price()).await {
            Ok(sale) => {
                let days_ago = ((seed * 7 + n * 11) % 30) as i64;
                sqlx::query("UPDATE sales SET sale_date = ?1 WHERE id = ?2")
                    .bind(Utc::now() - Duration::days(days_ago))
                    .bind(sale.id)
                    .execute(db.pool())
                    .await?;
                recorded += 1;
            }
            Err(LedgerError::Core(CoreError::InsufficientStock { .. })) => break,
            Err(e) => return Err(e.into()),
        }
    }

    info!(sku = %product.sku, sales = recorded, "Seeded product");
    Ok(recorded)
}

/// Log filter: `RUST_LOG` if set, otherwise ours at debug and sqlx quiet.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
