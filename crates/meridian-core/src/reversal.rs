//! # Reversal Allocator
//!
//! Pure allocation logic for sale reversals: given the original sale, the
//! lines of every prior reversal, and a reversal request, compute exactly
//! which quantities are still reversible and what the reversal is worth.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reversal Allocation                                  │
//! │                                                                         │
//! │  1. GUARD                                                              │
//! │     └── target is itself a reversal? → "cannot reverse a reversal"    │
//! │                                                                         │
//! │  2. REMAINING PER LINE                                                 │
//! │     └── bucket prior reversal lines by (product, unit price) tier,    │
//! │         then spend each tier's reversed magnitude against the         │
//! │         original lines in persisted order                              │
//! │                                                                         │
//! │  3. RESOLVE THE REQUEST                                                │
//! │     ├── explicit saleItemId entries first, quantity verbatim           │
//! │     ├── then productId entries, consuming line capacity in order       │
//! │     └── no items at all → every line's full remaining                  │
//! │                                                                         │
//! │  4. PRICE THE PLAN                                                     │
//! │     └── line subtotal = price × qty; line discount = pro-rata share   │
//! │         of the original discount; aggregates are the negated sums     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Price Tiers
//! The same product can appear on one sale at different historical unit
//! prices. Remaining-reversible quantity is tracked per (product, price)
//! pairing so a reversal at one price can never consume quantity sold at
//! another. Tier keys use the persisted integer cents, the same values
//! line pricing uses, so bucketing and pricing can never disagree.
//!
//! ## Determinism
//! Same inputs, same plan: lines are walked in persisted `position` order
//! and no clock, randomness, or map-iteration order is involved.

use std::collections::HashMap;

use crate::error::{ReversalError, ReversalResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Sale, SaleItem};

// =============================================================================
// Request & Plan Types
// =============================================================================

/// One entry of a partial reversal request, already validated and
/// converted at the boundary (quantities are positive fixed-point).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalItemRequest {
    /// Targets one specific sale line. Resolved before product-level
    /// entries; the quantity is taken verbatim against that line alone.
    pub sale_item_id: Option<String>,

    /// The product to reverse. With no `sale_item_id`, demand is spread
    /// across the product's lines in persisted order.
    pub product_id: String,

    /// How much to reverse. Always positive.
    pub quantity: Quantity,
}

/// One line of a computed reversal plan.
///
/// Quantities and amounts here are positive magnitudes; the sign flip to
/// "undoing value" happens in the plan aggregates and when the line is
/// persisted as a negative-quantity sale item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalLine {
    /// The original sale line this reversal line draws down.
    pub sale_item_id: String,
    pub product_id: String,

    /// Quantity to reverse (positive).
    pub quantity: Quantity,

    /// Unit price frozen on the original line.
    pub unit_price_cents: i64,

    /// unit price × quantity, rounded to cents.
    pub line_subtotal_cents: i64,

    /// This line's pro-rata share of the original sale's discount.
    pub line_discount_cents: i64,
}

/// The full output of allocation: reversal lines plus the aggregate
/// amounts for the reversal sale record.
///
/// Aggregates are non-positive: `total = -(subtotal_magnitude -
/// discount_magnitude)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalPlan {
    pub lines: Vec<ReversalLine>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl ReversalPlan {
    /// Total quantity restored to stock per product, in the order the
    /// products first appear on the plan. Positive magnitudes.
    pub fn restored_by_product(&self) -> Vec<(String, Quantity)> {
        let mut restored: Vec<(String, Quantity)> = Vec::new();
        for line in &self.lines {
            match restored.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => restored.push((line.product_id.clone(), line.quantity)),
            }
        }
        restored
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Computes a reversal plan for `original`.
///
/// ## Arguments
/// * `original` - the sale being reversed, with `original_items` in
///   persisted order
/// * `prior_reversal_items` - the lines of EVERY reversal sale already
///   recorded against `original` (quantities stored negative)
/// * `request` - `None` or an empty slice for a full reversal of all
///   remaining quantity; entries for a partial reversal
///
/// ## Errors
/// The closed [`ReversalError`] set: reversing a reversal, over-asking a
/// line or product, naming an item foreign to the sale, or finding
/// nothing left to reverse.
pub fn plan_reversal(
    original: &Sale,
    original_items: &[SaleItem],
    prior_reversal_items: &[SaleItem],
    request: Option<&[ReversalItemRequest]>,
) -> ReversalResult<ReversalPlan> {
    if original.is_reversal() {
        return Err(ReversalError::ReversalOfReversal);
    }

    let mut remaining = remaining_per_line(original_items, prior_reversal_items);
    let mut take = vec![Quantity::zero(); original_items.len()];

    match request {
        None | Some([]) => {
            // Full reversal: every line's entire remaining quantity.
            take.copy_from_slice(&remaining);
        }
        Some(entries) => {
            resolve_line_requests(original_items, &mut remaining, &mut take, entries)?;
            resolve_product_requests(original_items, &mut remaining, &mut take, entries)?;
        }
    }

    if take.iter().all(|qty| qty.is_zero()) {
        return Err(ReversalError::NothingLeftToReverse);
    }

    Ok(price_plan(original, original_items, &take))
}

/// Derives each line's still-reversible quantity.
///
/// Prior reversal lines carry no reference to the original line they drew
/// down, only the (product, unit price) tier, so each tier's reversed
/// magnitude is spent against that tier's lines in persisted order,
/// exactly the order allocation itself uses.
fn remaining_per_line(
    original_items: &[SaleItem],
    prior_reversal_items: &[SaleItem],
) -> Vec<Quantity> {
    let mut reversed_by_tier: HashMap<(&str, i64), Quantity> = HashMap::new();
    for item in prior_reversal_items {
        let key = (item.product_id.as_str(), item.unit_price_cents);
        // Reversal lines store negative quantities; the magnitude is the
        // amount already reversed at that tier.
        *reversed_by_tier.entry(key).or_default() += item.quantity.abs();
    }

    let mut remaining = Vec::with_capacity(original_items.len());
    for item in original_items {
        let key = (item.product_id.as_str(), item.unit_price_cents);
        let consumed = match reversed_by_tier.get_mut(&key) {
            Some(already) => {
                let consumed = item.quantity.min(*already);
                *already -= consumed;
                consumed
            }
            None => Quantity::zero(),
        };
        remaining.push(item.quantity - consumed);
    }
    remaining
}

/// Resolves explicit `sale_item_id` entries, quantity verbatim against
/// the named line. These go first; product-level entries then see only
/// what is left.
fn resolve_line_requests(
    original_items: &[SaleItem],
    remaining: &mut [Quantity],
    take: &mut [Quantity],
    entries: &[ReversalItemRequest],
) -> ReversalResult<()> {
    for entry in entries {
        let Some(target_id) = entry.sale_item_id.as_deref() else {
            continue;
        };
        let idx = original_items
            .iter()
            .position(|item| item.id == target_id && item.product_id == entry.product_id)
            .ok_or(ReversalError::ItemNotOnSale)?;

        if entry.quantity > remaining[idx] {
            return Err(ReversalError::ExceedsRemaining);
        }
        take[idx] += entry.quantity;
        remaining[idx] -= entry.quantity;
    }
    Ok(())
}

/// Resolves `product_id`-only entries by consuming the product's line
/// capacity in persisted order. Demand left over after every line is
/// visited means the caller asked for more than the product has across
/// all its lines.
fn resolve_product_requests(
    original_items: &[SaleItem],
    remaining: &mut [Quantity],
    take: &mut [Quantity],
    entries: &[ReversalItemRequest],
) -> ReversalResult<()> {
    for entry in entries {
        if entry.sale_item_id.is_some() {
            continue;
        }

        let mut demand = entry.quantity;
        let mut on_sale = false;
        for (idx, item) in original_items.iter().enumerate() {
            if item.product_id != entry.product_id {
                continue;
            }
            on_sale = true;
            let allocated = demand.min(remaining[idx]);
            if allocated.is_positive() {
                take[idx] += allocated;
                remaining[idx] -= allocated;
                demand -= allocated;
            }
            if demand.is_zero() {
                break;
            }
        }

        if !on_sale {
            return Err(ReversalError::ItemNotOnSale);
        }
        if demand.is_positive() {
            return Err(ReversalError::ExceedsRemaining);
        }
    }
    Ok(())
}

/// Prices the allocated quantities: per-line subtotal and pro-rata
/// discount share, then the negated aggregates.
fn price_plan(original: &Sale, original_items: &[SaleItem], take: &[Quantity]) -> ReversalPlan {
    let original_subtotal = original.subtotal();
    let original_discount = original.discount();

    let mut lines = Vec::new();
    let mut subtotal = Money::zero();
    let mut discount = Money::zero();

    for (item, &quantity) in original_items.iter().zip(take) {
        if !quantity.is_positive() {
            continue;
        }

        let line_subtotal = item.unit_price().line_total(quantity);
        let line_discount = line_subtotal.pro_rata(original_discount, original_subtotal);
        subtotal += line_subtotal;
        discount += line_discount;

        lines.push(ReversalLine {
            sale_item_id: item.id.clone(),
            product_id: item.product_id.clone(),
            quantity,
            unit_price_cents: item.unit_price_cents,
            line_subtotal_cents: line_subtotal.cents(),
            line_discount_cents: line_discount.cents(),
        });
    }

    ReversalPlan {
        lines,
        subtotal_cents: (-subtotal).cents(),
        discount_cents: (-discount).cents(),
        total_cents: (-(subtotal - discount)).cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
