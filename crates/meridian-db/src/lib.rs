//! # meridian-db: Database Layer for the Meridian Back-Office
//!
//! This crate provides SQLite persistence for the reversal engine, plus
//! the two components that must sit next to the store: the reversal
//! transaction coordinator and the stock-adjustment ledger writer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Meridian Data Flow                                  │
//! │                                                                         │
//! │  Caller (API layer): reverse_sale(sale_id, request)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    meridian-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ product, sale, │    │  (embedded)  │  │   │
//! │  │   │               │    │ stock + ledger │    │ 001_init.sql │  │   │
//! │  │   └───────┬───────┘    └────────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼──────────────────────────────┐                     │   │
//! │  │   │  ReversalCoordinator (reversal.rs)   │                     │   │
//! │  │   │  one transaction: allocator → sale   │                     │   │
//! │  │   │  + items → stock + ledger → commit   │                     │   │
//! │  │   └──────────────────────────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys on)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, stock)
//! - [`reversal`] - The reversal transaction coordinator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meridian_db::{Database, DbConfig};
//! use meridian_db::reversal::ReverseSaleRequest;
//!
//! let db = Database::new(DbConfig::new("path/to/meridian.db")).await?;
//!
//! let response = db
//!     .reversals()
//!     .reverse_sale(sale_id, &ReverseSaleRequest::full("cashier-1"))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod reversal;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository and coordinator re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::{StockAdjustmentError, StockChangeRequest, StockRepository};
pub use reversal::{ReversalCoordinator, ReverseSaleError, ReverseSaleRequest};
