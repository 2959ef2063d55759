//! Core Kernel - Foundational types for the visit billing system
//!
//! This crate provides the building blocks used across all other crates:
//! - A single-currency Money type with precise decimal arithmetic
//! - Inclusive-date temporal types for rate validity and billing ranges
//! - Strongly-typed identifiers, including the derived invoice number

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::Money;
pub use temporal::{DateRange, Validity, TemporalError};
pub use identifiers::{CustomerId, RateConditionId, VisitId, InvoiceNumber};
pub use error::CoreError;
