//! In-memory store adapters
//!
//! Implement the billing store ports on plain collections so the engine's
//! protocols can be exercised without a database. The adapters mirror the
//! PostgreSQL repositories' semantics: the paid-lock check-then-write is
//! atomic (one mutex guard), versioning closes the predecessor the day
//! before the successor, and `list_unpaid` orders newest first.
//!
//! `fail_next(n)` injects transient faults to exercise the engine's
//! bounded retry.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use core_kernel::{CustomerId, DateRange, InvoiceNumber, RateConditionId};
use domain_billing::{
    Customer, CustomerStore, Invoice, InvoiceStatus, InvoiceStore, NewInvoice, OpenInvoice,
    RateCondition, RateStore, RateTerms, StoreError, SubmitOutcome, VersionOutcome, Visit,
    VisitStore,
};

/// Transient-fault injector shared by the adapters.
#[derive(Default)]
struct FaultInjector {
    remaining: AtomicU32,
}

impl FaultInjector {
    fn arm(&self, failures: u32) {
        self.remaining.store(failures, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        let remaining = self.remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::unavailable("injected transient fault"));
        }
        Ok(())
    }
}

/// In-memory customer reader
#[derive(Default)]
pub struct InMemoryCustomerStore {
    customers: Mutex<HashMap<i64, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) {
        self.customers
            .lock()
            .unwrap()
            .insert(customer.id.value(), customer);
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.lock().unwrap().get(&id.value()).cloned())
    }
}

/// In-memory visit reader
#[derive(Default)]
pub struct InMemoryVisitStore {
    visits: Mutex<Vec<Visit>>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, visit: Visit) {
        self.visits.lock().unwrap().push(visit);
    }
}

#[async_trait]
impl VisitStore for InMemoryVisitStore {
    async fn visits_in_range(
        &self,
        customer: CustomerId,
        range: DateRange,
    ) -> Result<Vec<Visit>, StoreError> {
        let lower = range.start_of_first_day();
        let upper = range.end_of_last_day();

        let mut visits: Vec<Visit> = self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.customer_id == customer)
            .filter(|v| v.visited_at >= lower && v.visited_at <= upper)
            .cloned()
            .collect();
        visits.sort_by_key(|v| (v.visited_at, v.id));

        Ok(visits)
    }
}

/// In-memory rate ledger
pub struct InMemoryRateStore {
    conditions: Mutex<Vec<RateCondition>>,
    next_id: AtomicI64,
    faults: FaultInjector,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self {
            conditions: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            faults: FaultInjector::default(),
        }
    }

    /// Seeds a condition verbatim, bumping the id sequence past it.
    pub fn seed(&self, condition: RateCondition) {
        let id = condition.id.value();
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        self.conditions.lock().unwrap().push(condition);
    }

    /// Makes the next `failures` operations fail transiently.
    pub fn fail_next(&self, failures: u32) {
        self.faults.arm(failures);
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn conditions_for(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<RateCondition>, StoreError> {
        self.faults.check()?;

        let mut conditions: Vec<RateCondition> = self
            .conditions
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.customer_id == customer)
            .cloned()
            .collect();
        conditions.sort_by_key(|c| (c.validity.valid_from, c.id));

        Ok(conditions)
    }

    async fn version_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
        valid_from: NaiveDate,
    ) -> Result<VersionOutcome, StoreError> {
        self.faults.check()?;

        let mut conditions = self.conditions.lock().unwrap();

        if let Some(open) = conditions
            .iter_mut()
            .find(|c| c.customer_id == customer && c.is_open())
        {
            if valid_from <= open.validity.valid_from {
                return Ok(VersionOutcome::Conflict {
                    open_from: open.validity.valid_from,
                });
            }
            open.validity
                .close_before(valid_from)
                .map_err(|e| StoreError::internal(e.to_string()))?;
        }

        let created = RateCondition {
            id: RateConditionId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            customer_id: customer,
            terms,
            validity: core_kernel::Validity::open(valid_from),
        };
        conditions.push(created.clone());

        Ok(VersionOutcome::Created(created))
    }

    async fn correct_rate(
        &self,
        customer: CustomerId,
        terms: RateTerms,
    ) -> Result<Option<RateCondition>, StoreError> {
        self.faults.check()?;

        let mut conditions = self.conditions.lock().unwrap();
        let open = conditions
            .iter_mut()
            .find(|c| c.customer_id == customer && c.is_open());

        Ok(open.map(|condition| {
            condition.terms = terms;
            condition.clone()
        }))
    }
}

struct StoredInvoice {
    invoice: Invoice,
    seq: i64,
}

/// In-memory invoice register and payment tracker
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    invoices: Mutex<HashMap<String, StoredInvoice>>,
    customer_names: Mutex<HashMap<i64, String>>,
    seq: AtomicI64,
    faults: FaultInjector,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a customer name for the unpaid listing, which joins
    /// customer master data in the real store.
    pub fn register_customer_name(&self, customer: CustomerId, name: impl Into<String>) {
        self.customer_names
            .lock()
            .unwrap()
            .insert(customer.value(), name.into());
    }

    /// Makes the next `failures` operations fail transiently.
    pub fn fail_next(&self, failures: u32) {
        self.faults.arm(failures);
    }

    fn customer_name(&self, customer: CustomerId) -> String {
        self.customer_names
            .lock()
            .unwrap()
            .get(&customer.value())
            .cloned()
            .unwrap_or_else(|| format!("customer {customer}"))
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn submit(&self, invoice: &NewInvoice) -> Result<SubmitOutcome, StoreError> {
        self.faults.check()?;

        // One guard for check and write: mirrors the row lock the SQL
        // implementation takes before the upsert
        let mut invoices = self.invoices.lock().unwrap();

        match invoices.get_mut(invoice.number.as_str()) {
            Some(stored) if stored.invoice.status.is_paid() => Ok(SubmitOutcome::Locked),
            Some(stored) => {
                stored.invoice.rate_condition_id = invoice.rate_condition_id;
                stored.invoice.issued_on = invoice.issued_on;
                stored.invoice.total = invoice.total;
                stored.invoice.price_per_unit = invoice.price_per_unit;
                stored.invoice.unit_duration_min = invoice.unit_duration_min;
                stored.invoice.travel_distance_km = invoice.travel_distance_km;
                stored.invoice.travel_rate_per_km = invoice.travel_rate_per_km;
                Ok(SubmitOutcome::Replaced)
            }
            None => {
                invoices.insert(
                    invoice.number.as_str().to_string(),
                    StoredInvoice {
                        invoice: Invoice {
                            number: invoice.number.clone(),
                            customer_id: invoice.customer_id,
                            rate_condition_id: invoice.rate_condition_id,
                            issued_on: invoice.issued_on,
                            total: invoice.total,
                            price_per_unit: invoice.price_per_unit,
                            unit_duration_min: invoice.unit_duration_min,
                            travel_distance_km: invoice.travel_distance_km,
                            travel_rate_per_km: invoice.travel_rate_per_km,
                            status: InvoiceStatus::Draft,
                            created_at: Utc::now(),
                        },
                        seq: self.seq.fetch_add(1, Ordering::SeqCst),
                    },
                );
                Ok(SubmitOutcome::Created)
            }
        }
    }

    async fn mark_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError> {
        self.faults.check()?;

        let mut invoices = self.invoices.lock().unwrap();
        match invoices.get_mut(number.as_str()) {
            Some(stored) => {
                stored.invoice.status = InvoiceStatus::Paid;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn is_paid(&self, number: &InvoiceNumber) -> Result<bool, StoreError> {
        self.faults.check()?;

        Ok(self
            .invoices
            .lock()
            .unwrap()
            .get(number.as_str())
            .map(|stored| stored.invoice.status.is_paid())
            .unwrap_or(false))
    }

    async fn list_unpaid(&self) -> Result<Vec<OpenInvoice>, StoreError> {
        self.faults.check()?;

        let invoices = self.invoices.lock().unwrap();
        let mut unpaid: Vec<(&StoredInvoice, DateTime<Utc>)> = invoices
            .values()
            .filter(|stored| !stored.invoice.status.is_paid())
            .map(|stored| (stored, stored.invoice.created_at))
            .collect();
        unpaid.sort_by_key(|(stored, created_at)| std::cmp::Reverse((*created_at, stored.seq)));

        Ok(unpaid
            .into_iter()
            .map(|(stored, _)| OpenInvoice {
                number: stored.invoice.number.clone(),
                issued_on: stored.invoice.issued_on,
                customer_name: self.customer_name(stored.invoice.customer_id),
                total: stored.invoice.total,
            })
            .collect())
    }

    async fn get(&self, number: &InvoiceNumber) -> Result<Option<Invoice>, StoreError> {
        self.faults.check()?;

        Ok(self
            .invoices
            .lock()
            .unwrap()
            .get(number.as_str())
            .map(|stored| stored.invoice.clone()))
    }
}
