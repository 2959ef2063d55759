//! Test Utilities Crate
//!
//! Shared test infrastructure for the visit billing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `memstore`: In-memory implementations of the billing store ports,
//!   used to exercise the engine without a database

pub mod builders;
pub mod fixtures;
pub mod memstore;

pub use builders::*;
pub use fixtures::*;
pub use memstore::*;
