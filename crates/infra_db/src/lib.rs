//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the billing store ports using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository owns a pool
//! handle and implements one port trait from `domain_billing`. The two
//! multi-step protocols of the engine - rate versioning and the paid-lock
//! upsert - run inside a single transaction with a `FOR UPDATE` row lock,
//! so the check-then-write sequence is atomic against concurrent callers.
//!
//! Queries use SQLx's runtime-checked API so the workspace builds without
//! a live database; the schema lives in `migrations/`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, repositories::PgInvoiceStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/visitbilling")).await?;
//! let invoices = PgInvoiceStore::new(pool.clone());
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{PgCustomerStore, PgInvoiceStore, PgRateStore, PgVisitStore};
