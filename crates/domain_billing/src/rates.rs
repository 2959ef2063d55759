//! Temporal rate ledger
//!
//! Every customer carries a history of rate conditions, each valid over an
//! inclusive date interval. Exactly one condition per customer should be
//! open-ended (the active one); historical conditions keep their original
//! bounds so old visits always bill at the terms that applied back then.

use chrono::NaiveDate;
use core_kernel::{CustomerId, Money, RateConditionId, Validity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The numeric pricing fields of a condition.
///
/// Shared by versioning (new row) and correction (in-place fix); both
/// operate on exactly these fields and never on the validity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTerms {
    /// Price charged per billable unit
    pub price_per_unit: Money,
    /// Informational unit length in minutes, printed on invoices
    pub unit_duration_min: i32,
    /// One-way travel distance in kilometres
    pub travel_distance_km: Decimal,
    /// Compensation per kilometre
    pub travel_rate_per_km: Money,
}

impl RateTerms {
    /// Travel cost for one visited day: distance times per-km rate.
    pub fn travel_cost_per_day(&self) -> Money {
        self.travel_rate_per_km.multiply(self.travel_distance_km)
    }
}

/// A time-bounded set of pricing terms for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCondition {
    pub id: RateConditionId,
    pub customer_id: CustomerId,
    pub terms: RateTerms,
    pub validity: Validity,
}

impl RateCondition {
    /// Returns true if this condition covers the given day.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.validity.contains(date)
    }

    /// Returns true while this is the customer's open-ended condition.
    pub fn is_open(&self) -> bool {
        self.validity.is_open()
    }
}

/// A customer's full rate history with deterministic resolution.
///
/// The book answers "which terms applied on day D". Conditions are kept
/// sorted by `valid_from` so that, should the store ever contain
/// overlapping intervals, resolution still picks a single winner (earliest
/// `valid_from`) instead of silently matching two conditions and double-
/// or half-billing a visit.
#[derive(Debug, Clone)]
pub struct RateBook {
    customer_id: CustomerId,
    conditions: Vec<RateCondition>,
}

impl RateBook {
    /// Builds a book from a customer's conditions.
    ///
    /// Conditions belonging to other customers are discarded; the store
    /// query is already scoped, this guards against a mixed-up caller.
    pub fn new(customer_id: CustomerId, mut conditions: Vec<RateCondition>) -> Self {
        conditions.retain(|c| c.customer_id == customer_id);
        conditions.sort_by_key(|c| (c.validity.valid_from, c.id));
        Self {
            customer_id,
            conditions,
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[RateCondition] {
        &self.conditions
    }

    /// Resolves the condition in force on the given day.
    ///
    /// At most one condition should match; on overlapping data the first
    /// match in `valid_from` order wins, which is the documented
    /// tie-break.
    pub fn active_at(&self, date: NaiveDate) -> Option<&RateCondition> {
        self.conditions.iter().find(|c| c.applies_on(date))
    }

    /// The customer's currently open condition, if any.
    pub fn open_condition(&self) -> Option<&RateCondition> {
        self.conditions.iter().find(|c| c.is_open())
    }
}
