//! # Stock Repository & Adjustment Recorder
//!
//! Stock levels and the immutable stock-adjustment ledger.
//!
//! ## The Single Writer Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Every Stock Mutation Has A Ledger Row                   │
//! │                                                                         │
//! │  Reversal coordinator ──┐                                              │
//! │                         ├──► record_adjustment(conn, input)            │
//! │  Manual edit (adjust) ──┘         │                                     │
//! │                                   ├── INSERT INTO stock_adjustments    │
//! │                                   │   (before, after, change)          │
//! │                                   └── UPSERT stock.quantity = after    │
//! │                                                                         │
//! │  Nothing else writes either table. A stock row's quantity therefore    │
//! │  always equals the sum of quantity_change over its ledger rows.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use meridian_core::{Quantity, StockAdjustment, StockAdjustmentType, StockLevel, ValidationError};

// =============================================================================
// Inputs & Errors
// =============================================================================

/// Input to the recorder: the mutation is fully described by the
/// before/after pair; the change column is derived, never supplied.
#[derive(Debug, Clone)]
pub struct StockAdjustmentInput {
    pub product_id: String,
    pub adjustment_type: StockAdjustmentType,
    pub quantity_before: Quantity,
    pub quantity_after: Quantity,
    pub reason: Option<String>,
    /// Acting operator; None for system-originated adjustments.
    pub user_id: Option<String>,
}

/// A direct stock edit: a signed change applied to the current level.
#[derive(Debug, Clone)]
pub struct StockChangeRequest {
    pub product_id: String,
    pub adjustment_type: StockAdjustmentType,
    /// Signed change in hundredths: positive receives stock, negative
    /// removes it.
    pub change: Quantity,
    pub reason: Option<String>,
    pub user_id: Option<String>,
}

/// Errors from the direct adjustment entry point.
#[derive(Debug, Error)]
pub enum StockAdjustmentError {
    /// Request-shape failure (e.g. manual correction without a reason).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database failure, including a missing stock row.
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Stock Repository
// =============================================================================

/// Repository for stock levels and the adjustment ledger.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets the stock level row for a product.
    pub async fn get_level(&self, product_id: &str) -> DbResult<Option<StockLevel>> {
        let mut conn = self.pool.acquire().await?;
        fetch_level(&mut conn, product_id).await
    }

    /// Gets the current on-hand quantity for a product.
    pub async fn quantity(&self, product_id: &str) -> DbResult<Option<Quantity>> {
        Ok(self.get_level(product_id).await?.map(|level| level.quantity))
    }

    /// Lists a product's ledger rows, oldest first.
    pub async fn adjustments(&self, product_id: &str) -> DbResult<Vec<StockAdjustment>> {
        let rows = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT id, product_id, adjustment_type, quantity_before,
                   quantity_after, quantity_change, reason, user_id, created_at
            FROM stock_adjustments
            WHERE product_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Applies a direct stock edit in its own transaction.
    ///
    /// This is the entry point for every out-of-band mutation: supplier
    /// deliveries, damage write-offs, pack-size conversions, manual
    /// corrections, and initial stock. It reads the current level,
    /// derives the before/after pair, and routes through the recorder.
    ///
    /// ## Rules
    /// - `ManualCorrection` requires a non-blank reason
    /// - `InitialStock` may create the stock row (before = 0);
    ///   every other type requires the row to exist
    pub async fn adjust(
        &self,
        request: StockChangeRequest,
    ) -> Result<StockAdjustment, StockAdjustmentError> {
        if request.adjustment_type == StockAdjustmentType::ManualCorrection
            && request
                .reason
                .as_deref()
                .map_or(true, |reason| reason.trim().is_empty())
        {
            return Err(ValidationError::required("reason").into());
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let level = fetch_level(&mut tx, &request.product_id).await?;
        let before = match (level, request.adjustment_type) {
            (Some(level), _) => level.quantity,
            (None, StockAdjustmentType::InitialStock) => Quantity::zero(),
            (None, _) => {
                return Err(DbError::not_found("Stock", &request.product_id).into());
            }
        };

        let input = StockAdjustmentInput {
            product_id: request.product_id,
            adjustment_type: request.adjustment_type,
            quantity_before: before,
            quantity_after: before + request.change,
            reason: request.reason,
            user_id: request.user_id,
        };
        let row = record_adjustment(&mut tx, &input).await?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(row)
    }
}

// =============================================================================
// Connection-level operations
// =============================================================================

/// Fetches a product's stock level row.
pub(crate) async fn fetch_level(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<StockLevel>> {
    let level = sqlx::query_as::<_, StockLevel>(
        r#"
        SELECT product_id, quantity, updated_at
        FROM stock
        WHERE product_id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(level)
}

/// The single writer path for stock: appends one immutable ledger row
/// and sets the stock level to `quantity_after`, on the caller's open
/// connection or transaction.
///
/// `quantity_change` is always derived as `after − before`, so the
/// ledger invariant holds for every row this function ever writes.
/// Reason requirements are enforced by callers, not here.
pub async fn record_adjustment(
    conn: &mut SqliteConnection,
    input: &StockAdjustmentInput,
) -> DbResult<StockAdjustment> {
    let row = StockAdjustment {
        id: Uuid::new_v4().to_string(),
        product_id: input.product_id.clone(),
        adjustment_type: input.adjustment_type,
        quantity_before: input.quantity_before,
        quantity_after: input.quantity_after,
        quantity_change: input.quantity_after - input.quantity_before,
        reason: input.reason.clone(),
        user_id: input.user_id.clone(),
        created_at: Utc::now(),
    };

    debug!(
        product_id = %row.product_id,
        adjustment_type = ?row.adjustment_type,
        before = %row.quantity_before,
        after = %row.quantity_after,
        "Recording stock adjustment"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_adjustments (
            id, product_id, adjustment_type, quantity_before,
            quantity_after, quantity_change, reason, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&row.id)
    .bind(&row.product_id)
    .bind(row.adjustment_type)
    .bind(row.quantity_before)
    .bind(row.quantity_after)
    .bind(row.quantity_change)
    .bind(&row.reason)
    .bind(&row.user_id)
    .bind(row.created_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO stock (product_id, quantity, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(product_id) DO UPDATE SET
            quantity = excluded.quantity,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&row.product_id)
    .bind(row.quantity_after)
    .bind(row.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(row)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::new_product;

    async fn db_with_product() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = new_product("SKU-1", "Widget", 200);
        db.products().insert(&product).await.unwrap();
        (db, product.id)
    }

    fn change(
        product_id: &str,
        adjustment_type: StockAdjustmentType,
        hundredths: i64,
        reason: Option<&str>,
    ) -> StockChangeRequest {
        StockChangeRequest {
            product_id: product_id.to_string(),
            adjustment_type,
            change: Quantity::from_hundredths(hundredths),
            reason: reason.map(String::from),
            user_id: Some("manager-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_initial_stock_creates_level_and_ledger_row() {
        let (db, pid) = db_with_product().await;

        let row = db
            .stock()
            .adjust(change(&pid, StockAdjustmentType::InitialStock, 1000, None))
            .await
            .unwrap();

        assert_eq!(row.quantity_before, Quantity::zero());
        assert_eq!(row.quantity_after, Quantity::from_units(10));
        assert_eq!(row.quantity_change, Quantity::from_units(10));

        let level = db.stock().quantity(&pid).await.unwrap().unwrap();
        assert_eq!(level, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_adjustments_accumulate_and_ledger_stays_consistent() {
        let (db, pid) = db_with_product().await;
        let stock = db.stock();

        stock
            .adjust(change(&pid, StockAdjustmentType::InitialStock, 1000, None))
            .await
            .unwrap();
        stock
            .adjust(change(&pid, StockAdjustmentType::SupplierAdd, 500, None))
            .await
            .unwrap();
        stock
            .adjust(change(&pid, StockAdjustmentType::DamageRemoval, -200, None))
            .await
            .unwrap();
        stock
            .adjust(change(
                &pid,
                StockAdjustmentType::ManualCorrection,
                -50,
                Some("cycle count"),
            ))
            .await
            .unwrap();

        let level = stock.quantity(&pid).await.unwrap().unwrap();
        assert_eq!(level, Quantity::from_hundredths(1250));

        // Ledger consistency: level == sum of changes; every row
        // satisfies after = before + change
        let rows = stock.adjustments(&pid).await.unwrap();
        assert_eq!(rows.len(), 4);
        let sum = rows
            .iter()
            .fold(Quantity::zero(), |acc, row| acc + row.quantity_change);
        assert_eq!(sum, level);
        for row in &rows {
            assert_eq!(row.quantity_after, row.quantity_before + row.quantity_change);
        }
    }

    #[tokio::test]
    async fn test_manual_correction_requires_reason() {
        let (db, pid) = db_with_product().await;

        let err = db
            .stock()
            .adjust(change(&pid, StockAdjustmentType::ManualCorrection, 100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, StockAdjustmentError::Validation(_)));
        assert_eq!(err.to_string(), "reason is required");

        let err = db
            .stock()
            .adjust(change(
                &pid,
                StockAdjustmentType::ManualCorrection,
                100,
                Some("   "),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StockAdjustmentError::Validation(_)));

        // No ledger rows and no level were left behind
        assert!(db.stock().quantity(&pid).await.unwrap().is_none());
        assert!(db.stock().adjustments(&pid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_initial_adjustment_requires_existing_level() {
        let (db, pid) = db_with_product().await;

        let err = db
            .stock()
            .adjust(change(&pid, StockAdjustmentType::SupplierAdd, 100, None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StockAdjustmentError::Db(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_pack_conversions_round_trip() {
        let (db, pid) = db_with_product().await;
        let stock = db.stock();

        stock
            .adjust(change(&pid, StockAdjustmentType::InitialStock, 100, None))
            .await
            .unwrap();
        // One bulk unit becomes 24 singles tracked on another product in
        // practice; here the quantity delta alone is under test
        stock
            .adjust(change(&pid, StockAdjustmentType::BulkToSingles, -100, None))
            .await
            .unwrap();
        stock
            .adjust(change(&pid, StockAdjustmentType::SinglesToBulk, 100, None))
            .await
            .unwrap();

        assert_eq!(
            stock.quantity(&pid).await.unwrap().unwrap(),
            Quantity::from_units(1)
        );
    }
}
