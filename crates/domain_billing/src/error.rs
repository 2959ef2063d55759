//! Billing domain errors
//!
//! Business errors are terminal for the operation and carry the specific
//! reason; they are never retried. Store failures keep their own variant
//! so transient faults are never reinterpreted as business outcomes.

use chrono::NaiveDate;
use core_kernel::{CustomerId, InvoiceNumber, TemporalError};
use thiserror::Error;

use crate::ports::StoreError;

/// Errors that can occur in the billing engine
#[derive(Debug, Error)]
pub enum BillingError {
    /// No rate condition covered any visit in the requested range; must
    /// surface to the operator, never silently invoiced as zero
    #[error("no applicable rate for customer {customer} between {start} and {end}")]
    NoApplicableRate {
        customer: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Attempt to overwrite an invoice already marked paid
    #[error("invoice {0} is locked: it has been marked paid and is immutable")]
    Locked(InvoiceNumber),

    /// Rate versioning with a valid-from not strictly after the open
    /// condition's start
    #[error(
        "rate version conflict for customer {customer}: \
         {attempted} is not after the open condition's start {open_from}"
    )]
    Conflict {
        customer: CustomerId,
        attempted: NaiveDate,
        open_from: NaiveDate,
    },

    /// Operation on a customer, rate or invoice that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed billing period
    #[error("invalid period: {0}")]
    InvalidRange(#[from] TemporalError),

    /// Store failure that survived the bounded retries
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl BillingError {
    pub fn not_found(message: impl Into<String>) -> Self {
        BillingError::NotFound(message.into())
    }

    /// Returns true for terminal business errors, as opposed to store
    /// faults.
    pub fn is_business(&self) -> bool {
        !matches!(self, BillingError::Store(_))
    }
}
