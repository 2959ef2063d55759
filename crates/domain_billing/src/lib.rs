//! Billing Domain - Temporal Rate Billing & Invoice Integrity Engine
//!
//! This crate implements the billing core: resolving which pricing terms
//! applied to each historical visit, aggregating deterministic billing
//! snapshots, and enforcing that a paid invoice's financial content is
//! immutable.
//!
//! # Invariants
//!
//! - Per customer, at most one rate condition is open-ended at any time;
//!   versioning closes the predecessor the day before the successor starts.
//! - Rate resolution is deterministic even over inconsistent data: when
//!   validity intervals overlap, the condition with the earliest
//!   `valid_from` wins, so a visit is never billed twice or half.
//! - Once an invoice is marked paid it is frozen; the register rejects any
//!   later overwrite of its number.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingEngine, calculator};
//!
//! let engine = BillingEngine::new(customers, visits, rates, invoices);
//! let outcome = engine.compute_billing(customer_id, range).await?;
//! engine.submit(&outcome.snapshot).await?;
//! ```

pub mod calculator;
pub mod customer;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod ports;
pub mod rates;
pub mod snapshot;
pub mod visit;

pub use calculator::compute_billing;
pub use customer::{Address, Customer};
pub use engine::{BillingEngine, RetryPolicy};
pub use error::BillingError;
pub use invoice::{Invoice, InvoiceStatus, NewInvoice, OpenInvoice};
pub use ports::{
    CustomerStore, InvoiceStore, RateStore, StoreError, SubmitOutcome, VersionOutcome, VisitStore,
};
pub use rates::{RateBook, RateCondition, RateTerms};
pub use snapshot::{BillingOutcome, BillingSnapshot, CustomerSnapshot, TravelLine, VisitLine};
pub use visit::Visit;
