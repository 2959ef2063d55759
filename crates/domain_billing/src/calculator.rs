//! Billing calculator
//!
//! Joins a customer's visits against their rate history and produces a
//! [`BillingSnapshot`]. The join runs in process over explicit interval
//! logic: a visit is billed iff its timestamp lies within the requested
//! range *and* its calendar day lies within a condition's validity. Doing
//! the join here, rather than in SQL, keeps the boundary predicates fully
//! grouped and the tie-break deterministic.

use chrono::{Days, NaiveDate};
use core_kernel::{DateRange, InvoiceNumber, Money, RateConditionId};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::warn;

use crate::customer::Customer;
use crate::error::BillingError;
use crate::rates::RateBook;
use crate::snapshot::{
    BillingOutcome, BillingSnapshot, CustomerSnapshot, TravelLine, VisitLine, PAYMENT_TERMS_DAYS,
};
use crate::visit::Visit;

/// Computes the billing snapshot for a customer over an inclusive date
/// range.
///
/// # Arguments
///
/// * `customer` - The customer being billed
/// * `range` - Billing period, inclusive on both ends
/// * `visits` - The customer's visits; anything outside `range` is ignored
/// * `rates` - The customer's rate history
/// * `generated_on` - Generation date; determines the invoice number and
///   the due date, deliberately independent of `range`
///
/// # Errors
///
/// Returns [`BillingError::NoApplicableRate`] when not a single visit in
/// range resolves to a condition. An empty period must surface to the
/// operator instead of producing a zero-total invoice.
pub fn compute_billing(
    customer: &Customer,
    range: DateRange,
    visits: &[Visit],
    rates: &RateBook,
    generated_on: NaiveDate,
) -> Result<BillingOutcome, BillingError> {
    let lower = range.start_of_first_day();
    let upper = range.end_of_last_day();

    let mut in_range: Vec<&Visit> = visits
        .iter()
        .filter(|v| v.customer_id == customer.id)
        .filter(|v| v.visited_at >= lower && v.visited_at <= upper)
        .collect();
    in_range.sort_by_key(|v| (v.visited_at, v.id));

    let mut visit_lines = Vec::with_capacity(in_range.len());
    let mut uncovered_visits = Vec::new();
    // First condition resolved per day prices that day's travel charge;
    // in_range is sorted, so first insertion is the day's earliest visit
    let mut travel_by_day: BTreeMap<NaiveDate, &crate::rates::RateCondition> = BTreeMap::new();
    let mut snapshot_condition: Option<RateConditionId> = None;

    for visit in &in_range {
        let Some(condition) = rates.active_at(visit.day()) else {
            uncovered_visits.push(visit.id);
            continue;
        };

        let cost = condition
            .terms
            .price_per_unit
            .multiply(Decimal::from(visit.units))
            .round_cents();

        visit_lines.push(VisitLine {
            visit_id: visit.id,
            date: visit.day(),
            price_per_unit: condition.terms.price_per_unit,
            units: visit.units,
            unit_duration_min: condition.terms.unit_duration_min,
            note: visit.note.clone(),
            cost,
        });

        travel_by_day.entry(visit.day()).or_insert(condition);
        snapshot_condition.get_or_insert(condition.id);
    }

    let Some(rate_condition_id) = snapshot_condition else {
        return Err(BillingError::NoApplicableRate {
            customer: customer.id,
            start: range.start,
            end: range.end,
        });
    };

    if !uncovered_visits.is_empty() {
        warn!(
            customer = %customer.id,
            uncovered = uncovered_visits.len(),
            billed = visit_lines.len(),
            "visits without an applicable rate condition were excluded from billing"
        );
    }

    let travel_lines: Vec<TravelLine> = travel_by_day
        .iter()
        .map(|(&date, condition)| TravelLine {
            date,
            distance_km: condition.terms.travel_distance_km,
            rate_per_km: condition.terms.travel_rate_per_km,
            cost: condition.terms.travel_cost_per_day().round_cents(),
        })
        .collect();

    let units_total: Money = visit_lines.iter().map(|l| l.cost).sum();
    let travel_total: Money = travel_lines.iter().map(|l| l.cost).sum();
    let total = (units_total + travel_total).round_cents();

    let due_on = generated_on
        .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
        .expect("due date within chrono's representable range");

    let snapshot = BillingSnapshot {
        invoice_number: InvoiceNumber::derive(&customer.short_code, generated_on),
        issued_on: generated_on,
        due_on,
        customer_id: customer.id,
        customer: CustomerSnapshot::from(customer),
        rate_condition_id,
        visit_lines,
        travel_lines,
        total,
    };

    Ok(BillingOutcome {
        snapshot,
        uncovered_visits,
    })
}
