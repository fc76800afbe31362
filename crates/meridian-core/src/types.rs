//! # Domain Types
//!
//! Core domain types for the Meridian back-office ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │      Sale       │   │  StockAdjustment    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)          │   │
//! │  │  sku (business) │   │  receipt_number │   │  adjustment_type    │   │
//! │  │  name           │   │  reverses_sale  │   │  before/after/      │   │
//! │  │  price_cents    │   │  total_cents    │   │    change           │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │   SaleItem      │   │   StockLevel    │   │  PaymentMethod      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  quantity (±)   │   │  one row per    │   │  Cash, MobileMoney  │   │
//! │  │  unit_price     │   │  product        │   │  Card, Transfer     │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Conventions
//! - Original sale lines carry positive quantities; reversal lines negative.
//! - A reversal sale's subtotal/discount/total are non-positive: it undoes
//!   value.
//! - Every StockAdjustment satisfies `after = before + change`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;
use crate::receipt;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale (or reversal) was settled.
///
/// Serialized as the wire constants callers send (`CASH`, `MOBILE_MONEY`,
/// `CARD`, `TRANSFER`); stored lowercase in the database.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    Transfer,
}

impl PaymentMethod {
    /// Parses a caller-supplied payment method string, case-insensitively.
    ///
    /// ## Example
    /// ```rust
    /// use meridian_core::types::PaymentMethod;
    ///
    /// assert_eq!(PaymentMethod::parse("MOBILE_MONEY"), Some(PaymentMethod::MobileMoney));
    /// assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
    /// assert_eq!(PaymentMethod::parse("CHEQUE"), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CASH" => Some(PaymentMethod::Cash),
            "MOBILE_MONEY" => Some(PaymentMethod::MobileMoney),
            "CARD" => Some(PaymentMethod::Card),
            "TRANSFER" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }

    /// The wire constant for this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::MobileMoney => "MOBILE_MONEY",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Transfer => "TRANSFER",
        }
    }
}

// =============================================================================
// Stock Adjustment Type
// =============================================================================

/// Why a stock quantity changed.
///
/// Every mutation of a `StockLevel` row is explained by exactly one of
/// these, recorded on the ledger row that carried the change.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustmentType {
    /// First stock record for a product.
    InitialStock,
    /// Goods received from a supplier.
    SupplierAdd,
    /// Damaged or expired goods removed.
    DamageRemoval,
    /// A bulk unit broken into singles.
    BulkToSingles,
    /// Singles repacked into a bulk unit.
    SinglesToBulk,
    /// Operator correction; requires a reason.
    ManualCorrection,
    /// Stock consumed by a sale.
    Sale,
    /// Stock restored by a sale reversal.
    SaleReversal,
}

// =============================================================================
// Product
// =============================================================================

/// A product known to the back office.
///
/// Only the fields the reversal engine and its ledger need; catalog
/// management lives with the external caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Current list price in cents. Sale lines snapshot their own price,
    /// so historic lines may differ.
    pub price_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale, or a reversal sale undoing part of one.
///
/// Sales are append-only: created once at sale time (externally) or at
/// reversal time (by this engine), never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,

    /// Unique human/external key. Reversal receipts follow the
    /// `REV-<originalSaleId>-<epochMillis>-<random>` convention.
    pub receipt_number: String,

    /// Explicit reference to the sale this one reverses. Legacy rows
    /// predate this column and carry the reference only inside the
    /// receipt number.
    pub reverses_sale_id: Option<String>,

    /// Operator who recorded the sale or requested the reversal.
    pub user_id: String,

    pub payment_method: PaymentMethod,

    /// Sum of line totals before discount. Negative on reversal sales.
    pub subtotal_cents: i64,

    /// Aggregate discount. Negative on reversal sales.
    pub discount_cents: i64,

    /// subtotal − discount. Negative on reversal sales.
    pub total_cents: i64,

    /// Reversal sales copy the ORIGINAL sale's creation timestamp so the
    /// reversal lands in the same reporting period as the sale it undoes.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Whether this sale is itself a reversal.
    ///
    /// True for rows with the explicit reference as well as legacy rows
    /// whose receipt number carries the reversal marker.
    pub fn is_reversal(&self) -> bool {
        self.reverses_sale_id.is_some()
            || receipt::parse_reversal_receipt(&self.receipt_number).is_some()
    }

    /// The id of the sale this one reverses, from the explicit reference
    /// or, for legacy rows, parsed out of the receipt number.
    pub fn reversed_sale_id(&self) -> Option<&str> {
        self.reverses_sale_id
            .as_deref()
            .or_else(|| receipt::parse_reversal_receipt(&self.receipt_number))
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line on a sale.
///
/// The unit price is frozen at sale time; the same product can appear on
/// one sale at different historical prices, and reversal accounting keys
/// on that (product, price) pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Positive on original sale lines, negative on reversal lines.
    pub quantity: Quantity,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// quantity × unit price, rounded to cents. Negative on reversal lines.
    pub line_total_cents: i64,

    /// Persisted line order within the sale. Allocation walks lines in
    /// this order.
    pub position: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Stock Adjustment (ledger row)
// =============================================================================

/// One immutable stock ledger row.
///
/// Rows are append-only, never updated or deleted. The invariant
/// `quantity_after = quantity_before + quantity_change` holds for every
/// row ever written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: String,
    pub product_id: String,
    pub adjustment_type: StockAdjustmentType,

    /// On-hand quantity before the change.
    pub quantity_before: Quantity,

    /// On-hand quantity after the change.
    pub quantity_after: Quantity,

    /// after − before. Negative for removals.
    pub quantity_change: Quantity,

    /// Free-text explanation; required for manual corrections (enforced
    /// at the entry point, not here).
    pub reason: Option<String>,

    /// Acting operator; None for system-originated rows.
    pub user_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Level
// =============================================================================

/// Current on-hand quantity for one product.
///
/// Mutated in place, but only by applying a StockAdjustment's change;
/// at all times the quantity equals the sum of the product's ledger rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub product_id: String,
    pub quantity: Quantity,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(receipt_number: &str, reverses: Option<&str>) -> Sale {
        Sale {
            id: "s-1".to_string(),
            receipt_number: receipt_number.to_string(),
            reverses_sale_id: reverses.map(String::from),
            user_id: "u-1".to_string(),
            payment_method: PaymentMethod::Cash,
            subtotal_cents: 2000,
            discount_cents: 100,
            total_cents: 1900,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("CASH"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(
            PaymentMethod::parse(" mobile_money "),
            Some(PaymentMethod::MobileMoney)
        );
        assert_eq!(PaymentMethod::parse("CARD"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("TRANSFER"), Some(PaymentMethod::Transfer));
        assert_eq!(PaymentMethod::parse("CHEQUE"), None);
        assert_eq!(PaymentMethod::parse(""), None);
    }

    #[test]
    fn test_payment_method_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::MobileMoney,
            PaymentMethod::Card,
            PaymentMethod::Transfer,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }

    #[test]
    fn test_sale_is_reversal_explicit_reference() {
        let s = sale("20260131-01-0001", Some("orig-1"));
        assert!(s.is_reversal());
        assert_eq!(s.reversed_sale_id(), Some("orig-1"));
    }

    #[test]
    fn test_sale_is_reversal_legacy_receipt() {
        let s = sale("REV-orig-1-1738310400000-42", None);
        assert!(s.is_reversal());
        assert_eq!(s.reversed_sale_id(), Some("orig-1"));
    }

    #[test]
    fn test_sale_not_a_reversal() {
        let s = sale("20260131-01-0001", None);
        assert!(!s.is_reversal());
        assert_eq!(s.reversed_sale_id(), None);
    }

    #[test]
    fn test_money_accessors() {
        let s = sale("20260131-01-0001", None);
        assert_eq!(s.subtotal().cents(), 2000);
        assert_eq!(s.discount().cents(), 100);
        assert_eq!(s.total().cents(), 1900);
    }
}
