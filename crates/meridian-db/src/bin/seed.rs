//! # Seed Data Generator
//!
//! Populates a database with development data: products, initial stock
//! (routed through the adjustment ledger, so the seeded world already
//! satisfies the ledger invariant), and a handful of recorded sales to
//! reverse against.
//!
//! ## Usage
//! ```bash
//! # Seed 50 products into ./meridian.db (defaults)
//! cargo run -p meridian-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p meridian-db --bin seed -- --count 200 --db ./data/meridian.db
//! ```

use chrono::Utc;
use std::env;
use tracing::info;

use meridian_core::{PaymentMethod, Quantity, Sale, SaleItem, StockAdjustmentType};
use meridian_db::repository::product::new_product;
use meridian_db::repository::sale::{generate_receipt_number, generate_sale_id, generate_sale_item_id};
use meridian_db::{Database, DbConfig, StockChangeRequest};

/// Product categories for realistic development data.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Coca-Cola 330ml",
            "Sprite 330ml",
            "Still Water 500ml",
            "Orange Juice 1L",
            "Iced Tea 500ml",
        ],
    ),
    (
        "SNK",
        &["Potato Chips", "Salted Peanuts", "Chocolate Bar", "Biscuits", "Chewing Gum"],
    ),
    (
        "GRC",
        &["Rice 1kg", "Spaghetti 500g", "Tomato Paste", "Cooking Oil 1L", "Sugar 1kg"],
    ),
    (
        "DRY",
        &["Milk 1L", "Butter 250g", "Yogurt 500g", "Eggs (12)", "Cheese 200g"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (db_path, count) = parse_args();

    info!(db_path = %db_path, count, "Seeding development data");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut product_ids = Vec::with_capacity(count);
    for index in 0..count {
        let (category, names) = CATEGORIES[index % CATEGORIES.len()];
        let name = names[(index / CATEGORIES.len()) % names.len()];
        let sku = format!("{category}-{:04}", index + 1);
        // Prices spread 0.99 .. 19.99, deterministic per index
        let price_cents = 99 + ((index as i64 * 137) % 1900);

        let product = new_product(&sku, name, price_cents);
        db.products().insert(&product).await?;

        // Initial stock through the ledger: 10..59 units
        let units = 10 + (index as i64 % 50);
        db.stock()
            .adjust(StockChangeRequest {
                product_id: product.id.clone(),
                adjustment_type: StockAdjustmentType::InitialStock,
                change: Quantity::from_units(units),
                reason: None,
                user_id: None,
            })
            .await
            .map_err(|e| e.to_string())?;

        product_ids.push((product.id, price_cents));
    }

    info!(products = product_ids.len(), "Products seeded");

    // A few recorded sales to exercise reversals against
    let mut sales = 0usize;
    for chunk in product_ids.chunks(5).take(4) {
        let sale_id = record_demo_sale(&db, chunk).await?;
        info!(sale_id = %sale_id, "Demo sale recorded");
        sales += 1;
    }

    info!(sales, "Seed complete");
    db.close().await;
    Ok(())
}

/// Records one sale of 2 units of each given product, cash, 5% discount,
/// and draws the sold stock down through the ledger.
async fn record_demo_sale(
    db: &Database,
    products: &[(String, i64)],
) -> Result<String, Box<dyn std::error::Error>> {
    let sale_id = generate_sale_id();
    let now = Utc::now();
    let quantity = Quantity::from_units(2);

    let subtotal: i64 = products.iter().map(|(_, price)| price * 2).sum();
    let discount = subtotal / 20;

    db.sales()
        .insert_sale(&Sale {
            id: sale_id.clone(),
            receipt_number: generate_receipt_number(),
            reverses_sale_id: None,
            user_id: "seed-cashier".to_string(),
            payment_method: PaymentMethod::Cash,
            subtotal_cents: subtotal,
            discount_cents: discount,
            total_cents: subtotal - discount,
            created_at: now,
        })
        .await?;

    for (position, (product_id, price)) in products.iter().enumerate() {
        db.sales()
            .add_item(&SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale_id.clone(),
                product_id: product_id.clone(),
                quantity,
                unit_price_cents: *price,
                line_total_cents: price * 2,
                position: position as i64,
                created_at: now,
            })
            .await?;

        db.stock()
            .adjust(StockChangeRequest {
                product_id: product_id.clone(),
                adjustment_type: StockAdjustmentType::Sale,
                change: -quantity,
                reason: None,
                user_id: Some("seed-cashier".to_string()),
            })
            .await
            .map_err(|e| e.to_string())?;
    }

    Ok(sale_id)
}

/// Parses `--db <path>` and `--count <n>` from the command line.
fn parse_args() -> (String, usize) {
    let mut db_path = "./meridian.db".to_string();
    let mut count = 50usize;

    let args: Vec<String> = env::args().collect();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                if let Some(value) = iter.next() {
                    db_path = value.clone();
                }
            }
            "--count" => {
                if let Some(value) = iter.next() {
                    count = value.parse().unwrap_or(count);
                }
            }
            other => {
                eprintln!("Unknown argument: {other} (expected --db <path>, --count <n>)");
            }
        }
    }

    (db_path, count)
}
