//! Billing engine facade
//!
//! Ties the calculator and the store ports together into the operation set
//! exposed to the surrounding CRUD/UI layer. The engine owns the retry of
//! transient store faults: each port call is attempted a bounded number of
//! times with exponential backoff, while business outcomes pass through
//! untouched on the first attempt.

use chrono::{Local, NaiveDate};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use core_kernel::{CustomerId, DateRange, InvoiceNumber};

use crate::calculator;
use crate::customer::Customer;
use crate::error::BillingError;
use crate::invoice::{NewInvoice, OpenInvoice};
use crate::ports::{
    CustomerStore, InvoiceStore, RateStore, StoreError, SubmitOutcome, VersionOutcome, VisitStore,
};
use crate::rates::{RateBook, RateCondition, RateTerms};
use crate::snapshot::{BillingOutcome, BillingSnapshot};

/// Bounded retry of transient store faults.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff base; attempt n sleeps `base_delay * 2^(n-1)`
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Disables retrying entirely; useful in tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// The billing engine.
///
/// Stateless apart from the injected store handles; every operation
/// re-reads the store, so a failed call can simply be repeated.
pub struct BillingEngine {
    customers: Arc<dyn CustomerStore>,
    visits: Arc<dyn VisitStore>,
    rates: Arc<dyn RateStore>,
    invoices: Arc<dyn InvoiceStore>,
    retry: RetryPolicy,
}

impl BillingEngine {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        visits: Arc<dyn VisitStore>,
        rates: Arc<dyn RateStore>,
        invoices: Arc<dyn InvoiceStore>,
    ) -> Self {
        Self {
            customers,
            visits,
            rates,
            invoices,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Computes a billing snapshot for a customer and period.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown customer, `NoApplicableRate` when no
    /// visit in range resolves a condition.
    pub async fn compute_billing(
        &self,
        customer_id: CustomerId,
        range: DateRange,
    ) -> Result<BillingOutcome, BillingError> {
        let customer = self.load_customer(customer_id).await?;
        self.compute_for(&customer, range).await
    }

    /// The combined generation flow used by the UI: pre-flight the paid
    /// lock, compute, and submit in one call.
    ///
    /// The pre-flight check avoids recomputing a snapshot whose number is
    /// already frozen; the register re-checks atomically on submit, so a
    /// payment landing in between still cannot be overwritten.
    pub async fn generate_invoice(
        &self,
        customer_id: CustomerId,
        range: DateRange,
    ) -> Result<BillingOutcome, BillingError> {
        let customer = self.load_customer(customer_id).await?;

        let number = InvoiceNumber::derive(&customer.short_code, self.generation_date());
        let paid = self
            .with_retry("is_paid", || self.invoices.is_paid(&number))
            .await?;
        if paid {
            return Err(BillingError::Locked(number));
        }

        let outcome = self.compute_for(&customer, range).await?;
        self.submit(&outcome.snapshot).await?;
        Ok(outcome)
    }

    /// Submits a snapshot to the invoice register.
    ///
    /// # Errors
    ///
    /// `Locked` when an invoice with this number is already paid; the
    /// stored row is left untouched in that case.
    pub async fn submit(&self, snapshot: &BillingSnapshot) -> Result<SubmitOutcome, BillingError> {
        let invoice = NewInvoice::from_snapshot(snapshot);

        match self
            .with_retry("submit", || self.invoices.submit(&invoice))
            .await?
        {
            SubmitOutcome::Locked => Err(BillingError::Locked(invoice.number.clone())),
            outcome => {
                info!(
                    number = %invoice.number,
                    customer = %invoice.customer_id,
                    total = %invoice.total,
                    ?outcome,
                    "invoice recorded"
                );
                Ok(outcome)
            }
        }
    }

    /// Marks an invoice paid, freezing it forever. One-way; there is no
    /// unmark operation.
    pub async fn mark_paid(&self, number: &InvoiceNumber) -> Result<(), BillingError> {
        let updated = self
            .with_retry("mark_paid", || self.invoices.mark_paid(number))
            .await?;

        if updated {
            info!(%number, "invoice marked paid");
            Ok(())
        } else {
            Err(BillingError::not_found(format!("invoice {number}")))
        }
    }

    /// Paid state of an invoice; absent invoices report `false`.
    pub async fn is_paid(&self, number: &InvoiceNumber) -> Result<bool, BillingError> {
        Ok(self
            .with_retry("is_paid", || self.invoices.is_paid(number))
            .await?)
    }

    /// Unpaid invoices, newest first.
    pub async fn list_unpaid(&self) -> Result<Vec<OpenInvoice>, BillingError> {
        Ok(self
            .with_retry("list_unpaid", || self.invoices.list_unpaid())
            .await?)
    }

    /// Versions a customer's rate: closes the open condition the day
    /// before `valid_from` and opens a new one with the given terms.
    ///
    /// # Errors
    ///
    /// `Conflict` when `valid_from` is not strictly after the open
    /// condition's start, which would create a retroactive overlap.
    pub async fn version_rate(
        &self,
        customer_id: CustomerId,
        terms: RateTerms,
        valid_from: NaiveDate,
    ) -> Result<RateCondition, BillingError> {
        self.load_customer(customer_id).await?;

        match self
            .with_retry("version_rate", || {
                self.rates.version_rate(customer_id, terms, valid_from)
            })
            .await?
        {
            VersionOutcome::Created(condition) => {
                info!(
                    customer = %customer_id,
                    condition = %condition.id,
                    %valid_from,
                    "rate condition versioned"
                );
                Ok(condition)
            }
            VersionOutcome::Conflict { open_from } => Err(BillingError::Conflict {
                customer: customer_id,
                attempted: valid_from,
                open_from,
            }),
        }
    }

    /// Corrects a typo in the open condition's numeric fields without
    /// creating a new version.
    ///
    /// # Errors
    ///
    /// `NotFound` when the customer has no open condition.
    pub async fn correct_rate(
        &self,
        customer_id: CustomerId,
        terms: RateTerms,
    ) -> Result<RateCondition, BillingError> {
        self.load_customer(customer_id).await?;

        self.with_retry("correct_rate", || {
            self.rates.correct_rate(customer_id, terms)
        })
        .await?
        .ok_or_else(|| {
            BillingError::not_found(format!("open rate condition for customer {customer_id}"))
        })
    }

    async fn compute_for(
        &self,
        customer: &Customer,
        range: DateRange,
    ) -> Result<BillingOutcome, BillingError> {
        let visits = self
            .with_retry("visits_in_range", || {
                self.visits.visits_in_range(customer.id, range)
            })
            .await?;
        let conditions = self
            .with_retry("conditions_for", || self.rates.conditions_for(customer.id))
            .await?;

        let book = RateBook::new(customer.id, conditions);
        calculator::compute_billing(customer, range, &visits, &book, self.generation_date())
    }

    async fn load_customer(&self, customer_id: CustomerId) -> Result<Customer, BillingError> {
        self.with_retry("get_customer", || self.customers.get(customer_id))
            .await?
            .ok_or_else(|| BillingError::not_found(format!("customer {customer_id}")))
    }

    /// Invoices are numbered and dated by the operator's wall clock.
    fn generation_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        operation,
                        "transient store error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
