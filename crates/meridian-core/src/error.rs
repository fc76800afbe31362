//! # Error Types
//!
//! Domain-specific error types for meridian-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  meridian-core errors (this file)                                      │
//! │  ├── ReversalError    - Business-rule violations (closed message set)  │
//! │  └── ValidationError  - Request-shape failures                         │
//! │                                                                         │
//! │  meridian-db errors (separate crate)                                   │
//! │  ├── DbError          - Database / infrastructure failures             │
//! │  └── ReverseSaleError - Union surfaced to callers, classified          │
//! │                         client (400) vs server (500)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Errors are enum variants, never bare strings
//! 3. Business-rule messages form a CLOSED SET: callers dispatch on them,
//!    so the exact wording is part of the contract and covered by tests

use thiserror::Error;

// =============================================================================
// Reversal Error (business rules)
// =============================================================================

/// Business-rule violations raised by the reversal allocator and
/// coordinator.
///
/// Each variant's message is contractual: external callers map these
/// messages to client-facing 400 responses, so they must never change
/// wording without a protocol bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReversalError {
    /// The target sale is itself a reversal sale.
    #[error("cannot reverse a reversal")]
    ReversalOfReversal,

    /// A requested quantity exceeds what is still reversible for the
    /// line (or product) after accounting for prior reversals. Never
    /// silently clamped.
    #[error("requested reversal quantity exceeds remaining sold quantity")]
    ExceedsRemaining,

    /// The request names a line or product that is not on the original
    /// sale.
    #[error("requested item not part of the sale")]
    ItemNotOnSale,

    /// Nothing is reversible, e.g. a full reversal was requested but
    /// every line has already been reversed.
    #[error("nothing left to reverse")]
    NothingLeftToReverse,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Request validation errors.
///
/// These occur when a request doesn't meet shape requirements and are
/// rejected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A field value is outside its allowed set.
    #[error("{field} is invalid")]
    Invalid { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    /// Creates an Invalid error for the given field.
    pub fn invalid(field: impl Into<String>) -> Self {
        ValidationError::Invalid { field: field.into() }
    }

    /// Creates a MustBePositive error for the given field.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive { field: field.into() }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for allocation results.
pub type ReversalResult<T> = Result<T, ReversalError>;

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// The business-rule messages are contractual; pin them.
    #[test]
    fn test_reversal_error_messages() {
        assert_eq!(
            ReversalError::ReversalOfReversal.to_string(),
            "cannot reverse a reversal"
        );
        assert_eq!(
            ReversalError::ExceedsRemaining.to_string(),
            "requested reversal quantity exceeds remaining sold quantity"
        );
        assert_eq!(
            ReversalError::ItemNotOnSale.to_string(),
            "requested item not part of the sale"
        );
        assert_eq!(
            ReversalError::NothingLeftToReverse.to_string(),
            "nothing left to reverse"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("userId").to_string(),
            "userId is required"
        );
        assert_eq!(
            ValidationError::invalid("paymentMethod").to_string(),
            "paymentMethod is invalid"
        );
        assert_eq!(
            ValidationError::must_be_positive("quantity").to_string(),
            "quantity must be positive"
        );
    }
}
