//! # Validation Module
//!
//! Request field validation for the reversal engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (API / UI)                                            │
//! │  ├── Basic format checks                                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - request shape, before any store access         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Allocator - business rules against loaded state              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database - NOT NULL / UNIQUE / FK constraints                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in error messages use the wire spelling (`userId`,
//! `paymentMethod`) because the messages travel back to the caller.

use crate::error::{ValidationError, ValidationResult};
use crate::quantity::Quantity;
use crate::types::PaymentMethod;

/// Validates the acting user id. Required on every reversal request.
///
/// ## Example
/// ```rust
/// use meridian_core::validation::validate_user_id;
///
/// assert_eq!(validate_user_id(" cashier-1 ").unwrap(), "cashier-1");
/// assert!(validate_user_id("   ").is_err());
/// ```
pub fn validate_user_id(user_id: &str) -> ValidationResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ValidationError::required("userId"));
    }
    Ok(user_id)
}

/// Validates a caller-supplied payment method string.
///
/// ## Rules
/// Must be one of `CASH`, `MOBILE_MONEY`, `CARD`, `TRANSFER`
/// (case-insensitive).
pub fn validate_payment_method(method: &str) -> ValidationResult<PaymentMethod> {
    PaymentMethod::parse(method).ok_or_else(|| ValidationError::invalid("paymentMethod"))
}

/// Validates a product id reference on a reversal item entry.
pub fn validate_product_id(product_id: &str) -> ValidationResult<&str> {
    let product_id = product_id.trim();
    if product_id.is_empty() {
        return Err(ValidationError::required("productId"));
    }
    Ok(product_id)
}

/// Validates and converts a requested reversal quantity.
///
/// ## Rules
/// - Must be a finite number greater than zero
/// - Must still be positive after rounding to two decimal places
///   (0.001 of a unit is not a reversible quantity)
pub fn validate_reversal_quantity(quantity: f64) -> ValidationResult<Quantity> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    let quantity = Quantity::from_decimal(quantity);
    if !quantity.is_positive() {
        return Err(ValidationError::must_be_positive("quantity"));
    }
    Ok(quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id() {
        assert_eq!(validate_user_id("cashier-1").unwrap(), "cashier-1");
        assert_eq!(validate_user_id("  cashier-1  ").unwrap(), "cashier-1");

        assert_eq!(
            validate_user_id("").unwrap_err().to_string(),
            "userId is required"
        );
        assert!(validate_user_id("   ").is_err());
    }

    #[test]
    fn test_validate_payment_method() {
        assert_eq!(
            validate_payment_method("CASH").unwrap(),
            PaymentMethod::Cash
        );
        assert_eq!(
            validate_payment_method("mobile_money").unwrap(),
            PaymentMethod::MobileMoney
        );

        assert_eq!(
            validate_payment_method("BARTER").unwrap_err().to_string(),
            "paymentMethod is invalid"
        );
    }

    #[test]
    fn test_validate_product_id() {
        assert_eq!(validate_product_id("p-1").unwrap(), "p-1");
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("  ").is_err());
    }

    #[test]
    fn test_validate_reversal_quantity() {
        assert_eq!(
            validate_reversal_quantity(4.0).unwrap(),
            Quantity::from_units(4)
        );
        assert_eq!(
            validate_reversal_quantity(0.25).unwrap(),
            Quantity::from_hundredths(25)
        );

        assert!(validate_reversal_quantity(0.0).is_err());
        assert!(validate_reversal_quantity(-1.0).is_err());
        assert!(validate_reversal_quantity(f64::NAN).is_err());
        assert!(validate_reversal_quantity(f64::INFINITY).is_err());
        // Rounds to zero at two decimal places
        assert!(validate_reversal_quantity(0.001).is_err());
    }
}
