//! # Reversal Transaction Coordinator
//!
//! Wraps the pure allocator in one atomic unit of work.
//!
//! ## One Transaction, All Or Nothing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  reverse_sale(sale_id, request)                         │
//! │                                                                         │
//! │  0. VALIDATE REQUEST (no store access)                                 │
//! │     └── userId present, paymentMethod known, quantities positive       │
//! │                                                                         │
//! │  ┌───────────────── SINGLE TRANSACTION (≤ 60 s) ─────────────────────┐ │
//! │  │                                                                   │ │
//! │  │  1. Load original sale + items (persisted order)                  │ │
//! │  │  2. Load every prior reversal's lines                             │ │
//! │  │     (explicit reference OR legacy REV-… receipt)                  │ │
//! │  │  3. plan_reversal(…)        ← pure, meridian-core                 │ │
//! │  │  4. INSERT reversal sale    (original's creation timestamp)       │ │
//! │  │  5. INSERT reversal items   (negative quantities)                 │ │
//! │  │  6. Per distinct product: read stock "before",                    │ │
//! │  │     record_adjustment(sale_reversal, before → before + restored)  │ │
//! │  │                                                                   │ │
//! │  └── COMMIT ── any failure or the deadline rolls everything back ────┘ │
//! │                                                                         │
//! │  7. Return the reversal record (camelCase DTO, product-enriched)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! Business-rule and validation errors are client-class: the exact message
//! is part of the contract and surfaces unchanged. Everything else,
//! including a missing stock row (correct prior writes make that
//! impossible), is server-class, logged in full here and surfaced
//! generically. Nothing is retried; the caller resubmits and re-reads
//! remaining quantity.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{sale, stock};
use meridian_core::receipt::REVERSAL_PREFIX;
use meridian_core::validation::{
    validate_payment_method, validate_product_id, validate_reversal_quantity, validate_user_id,
};
use meridian_core::{
    plan_reversal, Money, PaymentMethod, Product, ReversalError, ReversalItemRequest, Sale,
    SaleItem, StockAdjustmentType, ValidationError,
};

// =============================================================================
// Request DTOs
// =============================================================================

/// A reversal request as external callers send it.
///
/// Absent (or empty) `items` means: reverse everything still remaining.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseSaleRequest {
    /// Acting operator. Required.
    pub user_id: String,

    /// Optional settlement override: one of `CASH`, `MOBILE_MONEY`,
    /// `CARD`, `TRANSFER`. Defaults to the original sale's method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Partial reversal entries; absent for a full reversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ReversalItemEntry>>,
}

impl ReverseSaleRequest {
    /// A full reversal on behalf of `user_id`.
    pub fn full(user_id: impl Into<String>) -> Self {
        ReverseSaleRequest {
            user_id: user_id.into(),
            payment_method: None,
            items: None,
        }
    }
}

/// One entry of a partial reversal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalItemEntry {
    /// Targets one specific line of the original sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_item_id: Option<String>,

    pub product_id: String,

    /// Decimal quantity to reverse; must be > 0.
    pub quantity: f64,
}

// =============================================================================
// Response DTOs
// =============================================================================

/// Success response: the created reversal sale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseSaleResponse {
    pub reversal: ReversalDto,
}

/// The reversal sale record, amounts converted back to decimal at this
/// boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalDto {
    pub id: String,
    pub receipt_number: String,

    /// The original sale, parsed back out for the caller's convenience.
    pub reverses_sale_id: String,

    pub user_id: String,
    pub payment_method: PaymentMethod,

    /// Non-positive: a reversal undoes value.
    pub subtotal: f64,
    pub discount: f64,
    pub total_amount: f64,

    /// Dated to the ORIGINAL sale's creation time for reporting
    /// continuity.
    pub created_at: chrono::DateTime<Utc>,

    pub items: Vec<ReversalItemDto>,
}

/// One reversal line: negative quantity and total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalItemDto {
    pub id: String,
    pub product_id: String,
    pub quantity: f64,
    pub price: f64,
    pub total: f64,

    /// The product record, when it still exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductDto>,
}

/// Product summary embedded in reversal lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub price: f64,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            price: product.price().to_decimal(),
            id: product.id,
            sku: product.sku,
            name: product.name,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Everything `reverse_sale` can fail with, classified for the caller.
#[derive(Debug, Error)]
pub enum ReverseSaleError {
    /// Request-shape failure. Client-class (400).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business-rule violation from the allocator. Client-class (400);
    /// the message is contractual.
    #[error(transparent)]
    Rule(#[from] ReversalError),

    /// Infrastructure or data-integrity failure. Server-class (500);
    /// detail is logged, callers surface it generically.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ReverseSaleError {
    /// Whether the caller is at fault (maps to a 400-class response).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReverseSaleError::Validation(_) | ReverseSaleError::Rule(_)
        )
    }

    /// The HTTP status class callers should map this error to.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// The reversal transaction coordinator.
///
/// Obtained from [`crate::Database::reversals`]; cheap to clone per
/// request.
#[derive(Debug, Clone)]
pub struct ReversalCoordinator {
    pool: SqlitePool,
    transaction_timeout: Duration,
}

impl ReversalCoordinator {
    /// Creates a coordinator over the given pool.
    pub fn new(pool: SqlitePool, transaction_timeout: Duration) -> Self {
        ReversalCoordinator {
            pool,
            transaction_timeout,
        }
    }

    /// Reverses all or part of `sale_id` on behalf of the requesting
    /// operator.
    ///
    /// ## Arguments
    /// * `sale_id` - the original sale to reverse
    /// * `request` - see [`ReverseSaleRequest`]; absent items ⇒ full
    ///   reversal of everything still remaining
    ///
    /// ## Errors
    /// Client-class: missing userId, invalid paymentMethod, non-positive
    /// quantity, and the allocator's closed rule set. Server-class:
    /// unknown sale, missing stock row, store failure, deadline
    /// exceeded. In every error case nothing has been persisted.
    pub async fn reverse_sale(
        &self,
        sale_id: &str,
        request: &ReverseSaleRequest,
    ) -> Result<ReverseSaleResponse, ReverseSaleError> {
        let user_id = validate_user_id(&request.user_id)?.to_string();
        let override_method = match request.payment_method.as_deref() {
            Some(method) => Some(validate_payment_method(method)?),
            None => None,
        };
        let entries = match request.items.as_deref() {
            None => None,
            Some(raw_entries) => {
                let mut entries = Vec::with_capacity(raw_entries.len());
                for entry in raw_entries {
                    entries.push(ReversalItemRequest {
                        sale_item_id: entry.sale_item_id.clone(),
                        product_id: validate_product_id(&entry.product_id)?.to_string(),
                        quantity: validate_reversal_quantity(entry.quantity)?,
                    });
                }
                Some(entries)
            }
        };

        debug!(sale_id, user_id = %user_id, partial = entries.is_some(), "Reversal requested");

        let result = tokio::time::timeout(
            self.transaction_timeout,
            self.run_transaction(sale_id, &user_id, override_method, entries.as_deref()),
        )
        .await
        .unwrap_or_else(|_elapsed| {
            // The transaction future was dropped mid-flight; the open
            // transaction rolls back and nothing is persisted.
            warn!(sale_id, timeout = ?self.transaction_timeout, "Reversal transaction timed out");
            Err(DbError::Timeout(self.transaction_timeout).into())
        });

        match &result {
            Ok(response) => {
                info!(
                    sale_id,
                    reversal_id = %response.reversal.id,
                    receipt_number = %response.reversal.receipt_number,
                    total_cents = %Money::from_decimal(response.reversal.total_amount),
                    "Sale reversed"
                );
            }
            Err(err) if err.is_client_error() => {
                debug!(sale_id, %err, "Reversal rejected");
            }
            Err(err) => {
                error!(sale_id, %err, "Reversal failed");
            }
        }

        result
    }

    /// The transactional body: everything between BEGIN and COMMIT.
    async fn run_transaction(
        &self,
        sale_id: &str,
        user_id: &str,
        override_method: Option<PaymentMethod>,
        entries: Option<&[ReversalItemRequest]>,
    ) -> Result<ReverseSaleResponse, ReverseSaleError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let original = sale::fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let original_items = sale::fetch_items(&mut tx, sale_id).await?;
        let prior_reversal_items = sale::fetch_reversal_items(&mut tx, sale_id).await?;

        let plan = plan_reversal(&original, &original_items, &prior_reversal_items, entries)?;

        let now = Utc::now();
        let reversal = Sale {
            id: Uuid::new_v4().to_string(),
            receipt_number: generate_reversal_receipt(&original.id),
            reverses_sale_id: Some(original.id.clone()),
            user_id: user_id.to_string(),
            payment_method: override_method.unwrap_or(original.payment_method),
            subtotal_cents: plan.subtotal_cents,
            discount_cents: plan.discount_cents,
            total_cents: plan.total_cents,
            // The reversal is dated to when the sale happened, not to now
            created_at: original.created_at,
        };
        sale::insert_sale(&mut tx, &reversal).await?;

        let mut reversal_items = Vec::with_capacity(plan.lines.len());
        for (position, line) in plan.lines.iter().enumerate() {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: reversal.id.clone(),
                product_id: line.product_id.clone(),
                quantity: -line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: -line.line_subtotal_cents,
                position: position as i64,
                created_at: now,
            };
            sale::insert_item(&mut tx, &item).await?;
            reversal_items.push(item);
        }

        // Restore stock product by product, every mutation through the
        // single writer path so the ledger invariant holds.
        for (product_id, restored) in plan.restored_by_product() {
            let level = stock::fetch_level(&mut tx, &product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Stock", &product_id))?;

            let input = stock::StockAdjustmentInput {
                product_id: product_id.clone(),
                adjustment_type: StockAdjustmentType::SaleReversal,
                quantity_before: level.quantity,
                quantity_after: level.quantity + restored,
                reason: None,
                user_id: Some(user_id.to_string()),
            };
            stock::record_adjustment(&mut tx, &input).await?;
        }

        // Product enrichment for the response, still inside the
        // transaction so the view is consistent
        let mut products: HashMap<String, ProductDto> = HashMap::new();
        for item in &reversal_items {
            if !products.contains_key(&item.product_id) {
                if let Some(product) =
                    crate::repository::product::fetch_product(&mut tx, &item.product_id).await?
                {
                    products.insert(item.product_id.clone(), product.into());
                }
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(build_response(reversal, reversal_items, &products))
    }
}

/// Generates a reversal receipt number:
/// `REV-<originalSaleId>-<epochMillis>-<0..999 random>`.
///
/// Must stay parseable by
/// [`meridian_core::receipt::parse_reversal_receipt`]; the round-trip is
/// covered by tests.
pub fn generate_reversal_receipt(original_sale_id: &str) -> String {
    let now = Utc::now();
    let random = (Uuid::new_v4().as_u128() % 1000) as u16;
    format!(
        "{REVERSAL_PREFIX}{original_sale_id}-{}-{}",
        now.timestamp_millis(),
        random
    )
}

/// Assembles the response DTO, converting amounts back to decimal.
fn build_response(
    reversal: Sale,
    items: Vec<SaleItem>,
    products: &HashMap<String, ProductDto>,
) -> ReverseSaleResponse {
    let reverses_sale_id = reversal
        .reverses_sale_id
        .clone()
        .unwrap_or_default();

    ReverseSaleResponse {
        reversal: ReversalDto {
            reverses_sale_id,
            subtotal: reversal.subtotal().to_decimal(),
            discount: reversal.discount().to_decimal(),
            total_amount: reversal.total().to_decimal(),
            items: items
                .into_iter()
                .map(|item| ReversalItemDto {
                    quantity: item.quantity.to_decimal(),
                    price: item.unit_price().to_decimal(),
                    total: item.line_total().to_decimal(),
                    product: products.get(&item.product_id).cloned(),
                    id: item.id,
                    product_id: item.product_id,
                })
                .collect(),
            id: reversal.id,
            receipt_number: reversal.receipt_number,
            user_id: reversal.user_id,
            payment_method: reversal.payment_method,
            created_at: reversal.created_at,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
