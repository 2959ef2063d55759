//! Billing snapshot value types
//!
//! A snapshot is the computed result of aggregating visits and rates for a
//! period. It is a value, not an entity: recomputing it over unchanged
//! inputs yields an identical snapshot, and it only becomes a store of
//! truth once the register accepts it.

use chrono::NaiveDate;
use core_kernel::{CustomerId, InvoiceNumber, Money, RateConditionId, VisitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::customer::Customer;

/// Payment terms applied to every generated invoice.
pub const PAYMENT_TERMS_DAYS: u64 = 14;

/// The customer master data frozen into a snapshot at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub contact_person: Option<String>,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            contact_person: customer.contact_person.clone(),
            street: customer.address.street.clone(),
            house_number: customer.address.house_number.clone(),
            postal_code: customer.address.postal_code.clone(),
            city: customer.address.city.clone(),
        }
    }
}

/// One billed visit on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLine {
    pub visit_id: VisitId,
    pub date: NaiveDate,
    pub price_per_unit: Money,
    pub units: i32,
    pub unit_duration_min: i32,
    pub note: Option<String>,
    pub cost: Money,
}

/// One travel charge, at most one per visited calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelLine {
    pub date: NaiveDate,
    pub distance_km: Decimal,
    pub rate_per_km: Money,
    pub cost: Money,
}

/// The computed billing result for one customer and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    pub invoice_number: InvoiceNumber,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub customer_id: CustomerId,
    pub customer: CustomerSnapshot,
    /// Condition of the earliest billed visit, kept for audit
    pub rate_condition_id: RateConditionId,
    pub visit_lines: Vec<VisitLine>,
    pub travel_lines: Vec<TravelLine>,
    pub total: Money,
}

impl BillingSnapshot {
    /// Sum of the per-unit costs over all visit lines.
    pub fn units_total(&self) -> Money {
        self.visit_lines.iter().map(|l| l.cost).sum()
    }

    /// Sum of the daily travel charges.
    pub fn travel_total(&self) -> Money {
        self.travel_lines.iter().map(|l| l.cost).sum()
    }
}

/// A snapshot together with its coverage diagnostics.
///
/// Visits without an applicable rate condition are excluded from the
/// snapshot's line items but must not disappear silently; the caller
/// surfaces them to the operator as a partial-coverage warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingOutcome {
    pub snapshot: BillingSnapshot,
    /// Visits in range that no rate condition covered
    pub uncovered_visits: Vec<VisitId>,
}

impl BillingOutcome {
    /// Returns true when every visit in range was billed.
    pub fn has_full_coverage(&self) -> bool {
        self.uncovered_visits.is_empty()
    }
}
