//! # meridian-core: Pure Business Logic for the Meridian Back-Office
//!
//! This crate is the **heart** of the reversal engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Meridian Back-Office Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            External Callers (API layer, back-office UI)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                meridian-db (Persistence Layer)                  │   │
//! │  │    reversal coordinator, repositories, stock ledger writer      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ meridian-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │ quantity │ │     reversal     │  │   │
//! │  │   │  Sale    │ │  Money   │ │ Quantity │ │  plan_reversal   │  │   │
//! │  │   │  Ledger  │ │  cents   │ │ 1/100ths │ │  (pure function) │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCKS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, SaleItem, StockAdjustment, ...)
//! - [`money`] - Money type with integer-cent arithmetic (no floats!)
//! - [`quantity`] - Fixed-point quantities in hundredths of a unit
//! - [`reversal`] - The reversal allocator, a pure function
//! - [`receipt`] - Reversal receipt-number convention parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Request field validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: allocation is deterministic - same input, same plan
//! 2. **No I/O**: database, network, clocks and entropy are FORBIDDEN here
//! 3. **Integer Arithmetic**: cents for money, hundredths for quantity
//! 4. **Explicit Errors**: all errors are typed; business-rule messages
//!    form a closed, contractual set
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::quantity::Quantity;
//!
//! // 4.00 units at $2.00
//! let line = Money::from_cents(200).line_total(Quantity::from_units(4));
//! assert_eq!(line.cents(), 800);
//!
//! // its share of a $1.00 discount on a $20.00 sale
//! let share = line.pro_rata(Money::from_cents(100), Money::from_cents(2000));
//! assert_eq!(share.cents(), 40);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod quantity;
pub mod receipt;
pub mod reversal;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use error::{ReversalError, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use reversal::{plan_reversal, ReversalItemRequest, ReversalLine, ReversalPlan};
pub use types::*;
