//! Billing DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_billing::{BillingOutcome, BillingSnapshot};

/// Request to compute (or compute and book) a billing snapshot
#[derive(Debug, Deserialize, Validate)]
pub struct ComputeBillingRequest {
    #[validate(range(min = 1))]
    pub customer_id: i64,
    /// First day of the billing period (inclusive)
    pub start: NaiveDate,
    /// Last day of the billing period (inclusive)
    pub end: NaiveDate,
}

/// A computed snapshot plus its coverage diagnostics
#[derive(Debug, Serialize)]
pub struct BillingOutcomeResponse {
    pub snapshot: BillingSnapshot,
    /// Ids of visits in range that no rate condition covered
    pub uncovered_visits: Vec<i64>,
    /// Operator-facing partial-coverage warning, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<BillingOutcome> for BillingOutcomeResponse {
    fn from(outcome: BillingOutcome) -> Self {
        let warning = if outcome.has_full_coverage() {
            None
        } else {
            Some(format!(
                "{} visit(s) in the period had no applicable rate condition and were not billed",
                outcome.uncovered_visits.len()
            ))
        };

        Self {
            snapshot: outcome.snapshot,
            uncovered_visits: outcome.uncovered_visits.iter().map(|v| v.value()).collect(),
            warning,
        }
    }
}
