//! Store ports
//!
//! The engine is stateless compute over a shared relational store; these
//! traits are its only view of that store. The PostgreSQL adapters live in
//! `infra_db`; `test_utils` ships in-memory implementations for tests.
//!
//! Multi-step protocols (rate versioning, the paid-lock upsert) are
//! defined here as single operations so every implementation is forced to
//! make the check-then-write sequence atomic on its side.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_kernel::{CustomerId, DateRange, InvoiceNumber};
use thiserror::Error;

use crate::customer::Customer;
use crate::invoice::{Invoice, NewInvoice, OpenInvoice};
use crate::rates::{RateCondition, RateTerms};
use crate::visit::Visit;

/// Transport-level failure of a store operation.
///
/// Business outcomes (lock hit, version conflict, missing row) are *not*
/// errors at this layer; the port methods encode them in their return
/// types so they can never be confused with a flaky connection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection could not be established or was lost mid-operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Deadlock or serialization failure; safe to retry
    #[error("transaction aborted: {0}")]
    Serialization(String),

    /// Anything else: constraint violations, malformed rows, bugs
    #[error("store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal(message.into())
    }

    /// Returns true if retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Serialization(_)
        )
    }
}

/// Result of submitting a snapshot to the invoice register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No invoice with this number existed; a draft row was inserted
    Created,
    /// An unpaid draft existed and was fully overwritten
    Replaced,
    /// The invoice is paid; nothing was touched
    Locked,
}

/// Result of a rate versioning attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOutcome {
    /// The new open condition, with the predecessor (if any) closed
    Created(RateCondition),
    /// The open condition already starts on or after the requested day
    Conflict { open_from: NaiveDate },
}

/// Read access to customer master data.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

/// Read access to visit records.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Visits of one customer with a timestamp inside the range, widened
    /// to whole days, ordered by timestamp.
    async fn visits_in_range(
        &self,
        customer: CustomerId,
        range: DateRange,
    ) -> Result<Vec<Visit>, StoreError>;
}

/// The rate ledger.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Full rate history of a customer.
    async fn conditions_for(&self, customer: CustomerId)
        -> Result<Vec<RateCondition>, StoreError>;

    /// Atomically closes the open condition the day before `valid_from`
    /// and inserts a new open condition with the given terms.
    async fn version_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
        valid_from: NaiveDate,
    ) -> Result<VersionOutcome, StoreError>;

    /// Overwrites the numeric fields of the open condition in place,
    /// leaving its validity untouched. Returns `None` when the customer
    /// has no open condition.
    async fn correct_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
    ) -> Result<Option<RateCondition>, StoreError>;
}

/// The invoice register and payment tracker.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Upsert-or-reject: inserts the invoice, overwrites an unpaid draft
    /// with the same number, or reports `Locked` for a paid one. The
    /// paid-check and the write are one atomic unit.
    async fn submit(&self, invoice: &NewInvoice) -> Result<SubmitOutcome, StoreError>;

    /// Flips the paid flag. Returns `false` when no such invoice exists.
    async fn mark_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError>;

    /// Paid state of an invoice; an absent invoice is simply not paid.
    async fn is_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError>;

    /// Unpaid invoices, newest first.
    async fn list_unpaid(&self) -> Result<Vec<OpenInvoice>, StoreError>;

    /// Reads a stored invoice back, mostly for audit and tests.
    async fn get(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, StoreError>;
}
