//! # Repository Module
//!
//! Database repository implementations for the Meridian back-office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.sales().get_by_id("…")                                     │
//! │       ▼                                                                 │
//! │  SaleRepository (owns a pool handle)                                   │
//! │       │  delegates to a connection-level fetch function                 │
//! │       ▼                                                                 │
//! │  pub(crate) fetch_sale(&mut SqliteConnection, …)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! │  The connection-level functions are the single home of each query,     │
//! │  so the reversal coordinator can reuse them inside its one open        │
//! │  transaction while ordinary callers go through the pool.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product lookups and inserts
//! - [`sale::SaleRepository`] - Sale and sale item persistence
//! - [`stock::StockRepository`] - Stock levels and the adjustment ledger

pub mod product;
pub mod sale;
pub mod stock;
