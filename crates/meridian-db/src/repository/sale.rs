//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Append-Only Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (external caller, or a test fixture)                        │
//! │     └── insert_sale() + add_item() per line                            │
//! │                                                                         │
//! │  2. REVERSE (this engine)                                              │
//! │     └── the coordinator inserts a second Sale whose receipt carries    │
//! │         the REV marker, whose reverses_sale_id points back, and        │
//! │         whose items carry negative quantities                          │
//! │                                                                         │
//! │  Neither record is ever updated or deleted.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use meridian_core::receipt::REVERSAL_PREFIX;
use meridian_core::{Sale, SaleItem};

/// Repository for sale database operations.
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
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Gets a sale by its receipt number.
    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, reverses_sale_id, user_id, payment_method,
                   subtotal_cents, discount_cents, total_cents, created_at
            FROM sales
            WHERE receipt_number = ?1
            "#,
        )
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Inserts a sale record.
    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_sale(&mut conn, sale).await
    }

    /// Adds an item to a sale.
    pub async fn add_item(&self, item: &SaleItem) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_item(&mut conn, item).await
    }

    /// Gets all items for a sale, in persisted line order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, sale_id).await
    }

    /// Lists the reversal sales recorded against an original sale.
    ///
    /// Matches both the explicit reference and legacy rows that only
    /// carry the receipt-number convention.
    pub async fn list_reversals(&self, original_sale_id: &str) -> DbResult<Vec<Sale>> {
        let pattern = legacy_receipt_pattern(original_sale_id);
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, reverses_sale_id, user_id, payment_method,
                   subtotal_cents, discount_cents, total_cents, created_at
            FROM sales
            WHERE reverses_sale_id = ?1 OR receipt_number LIKE ?2
            ORDER BY created_at, id
            "#,
        )
        .bind(original_sale_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Connection-level operations (shared with the reversal transaction)
// =============================================================================

/// Fetches one sale by id.
pub(crate) async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, receipt_number, reverses_sale_id, user_id, payment_method,
               subtotal_cents, discount_cents, total_cents, created_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Fetches a sale's items in persisted line order.
pub(crate) async fn fetch_items(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT id, sale_id, product_id, quantity, unit_price_cents,
               line_total_cents, position, created_at
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY position
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Fetches the lines of every reversal sale recorded against an
/// original, in reversal creation order then line order.
///
/// The OR arm keeps legacy reversals (receipt-number link only) counting
/// against remaining quantity.
pub(crate) async fn fetch_reversal_items(
    conn: &mut SqliteConnection,
    original_sale_id: &str,
) -> DbResult<Vec<SaleItem>> {
    let pattern = legacy_receipt_pattern(original_sale_id);
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT si.id, si.sale_id, si.product_id, si.quantity,
               si.unit_price_cents, si.line_total_cents, si.position, si.created_at
        FROM sale_items si
        INNER JOIN sales s ON s.id = si.sale_id
        WHERE s.reverses_sale_id = ?1 OR s.receipt_number LIKE ?2
        ORDER BY s.created_at, s.id, si.position
        "#,
    )
    .bind(original_sale_id)
    .bind(pattern)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Inserts a sale record.
pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, receipt_number, reverses_sale_id, user_id, payment_method,
            subtotal_cents, discount_cents, total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.receipt_number)
    .bind(&sale.reverses_sale_id)
    .bind(&sale.user_id)
    .bind(sale.payment_method)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts one sale item.
pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Adding sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, quantity, unit_price_cents,
            line_total_cents, position, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.line_total_cents)
    .bind(item.position)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// The LIKE pattern matching legacy reversal receipts of one sale.
fn legacy_receipt_pattern(original_sale_id: &str) -> String {
    format!("{REVERSAL_PREFIX}{original_sale_id}-%")
}

/// Generates an ordinary (non-reversal) receipt number:
/// `YYMMDD-HHMMSS-NNNN`.
pub fn generate_receipt_number() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let random: u16 = (nanos % 10000) as u16;
    format!("{}-{:04}", now.format("%y%m%d-%H%M%S"), random)
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::new_product;
    use meridian_core::{PaymentMethod, Quantity};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sale(id: &str, receipt: &str, reverses: Option<&str>) -> Sale {
        Sale {
            id: id.to_string(),
            receipt_number: receipt.to_string(),
            reverses_sale_id: reverses.map(String::from),
            user_id: "cashier-1".to_string(),
            payment_method: PaymentMethod::Cash,
            subtotal_cents: 2000,
            discount_cents: 100,
            total_cents: 1900,
            created_at: Utc::now(),
        }
    }

    fn line(id: &str, sale_id: &str, product_id: &str, qty_hundredths: i64, position: i64) -> SaleItem {
        SaleItem {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
            quantity: Quantity::from_hundredths(qty_hundredths),
            unit_price_cents: 200,
            line_total_cents: 200 * qty_hundredths / 100,
            position,
            created_at: Utc::now(),
        }
    }

    async fn seed_product(db: &Database) -> String {
        let product = new_product("SKU-1", "Widget", 200);
        db.products().insert(&product).await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_sale_round_trip() {
        let db = test_db().await;
        let product_id = seed_product(&db).await;

        let s = sale("s1", "260131-120000-0001", None);
        db.sales().insert_sale(&s).await.unwrap();
        db.sales()
            .add_item(&line("l1", "s1", &product_id, 1000, 0))
            .await
            .unwrap();

        let loaded = db.sales().get_by_id("s1").await.unwrap().unwrap();
        assert_eq!(loaded.receipt_number, "260131-120000-0001");
        assert_eq!(loaded.payment_method, PaymentMethod::Cash);
        assert_eq!(loaded.total_cents, 1900);
        assert!(!loaded.is_reversal());

        let by_receipt = db
            .sales()
            .get_by_receipt("260131-120000-0001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_receipt.id, "s1");

        let items = db.sales().get_items("s1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_items_come_back_in_position_order() {
        let db = test_db().await;
        let product_id = seed_product(&db).await;

        db.sales()
            .insert_sale(&sale("s1", "260131-120000-0002", None))
            .await
            .unwrap();
        // Insert out of order on purpose
        db.sales()
            .add_item(&line("l2", "s1", &product_id, 100, 1))
            .await
            .unwrap();
        db.sales()
            .add_item(&line("l1", "s1", &product_id, 300, 0))
            .await
            .unwrap();

        let items = db.sales().get_items("s1").await.unwrap();
        assert_eq!(items[0].id, "l1");
        assert_eq!(items[1].id, "l2");
    }

    #[tokio::test]
    async fn test_list_reversals_by_reference_and_legacy_receipt() {
        let db = test_db().await;
        let _product_id = seed_product(&db).await;

        db.sales()
            .insert_sale(&sale("orig", "260131-120000-0003", None))
            .await
            .unwrap();
        // Modern reversal: explicit reference
        db.sales()
            .insert_sale(&sale("rev1", "REV-orig-1700000000000-1", Some("orig")))
            .await
            .unwrap();
        // Legacy reversal: receipt-number link only
        db.sales()
            .insert_sale(&sale("rev2", "REV-orig-1700000000001-2", None))
            .await
            .unwrap();
        // Unrelated sale
        db.sales()
            .insert_sale(&sale("other", "260131-120000-0004", None))
            .await
            .unwrap();

        let reversals = db.sales().list_reversals("orig").await.unwrap();
        let ids: Vec<&str> = reversals.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"rev1"));
        assert!(ids.contains(&"rev2"));
    }

    #[tokio::test]
    async fn test_duplicate_receipt_number_rejected() {
        let db = test_db().await;

        db.sales()
            .insert_sale(&sale("s1", "260131-120000-0005", None))
            .await
            .unwrap();
        let err = db
            .sales()
            .insert_sale(&sale("s2", "260131-120000-0005", None))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));
    }
}
