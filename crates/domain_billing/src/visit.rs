//! Visit read model
//!
//! Visits are recorded by the surrounding CRUD surface and are immutable
//! within the engine's scope; billing only reads them.

use chrono::{NaiveDate, NaiveDateTime};
use core_kernel::{CustomerId, VisitId};
use serde::{Deserialize, Serialize};

/// A single customer visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub customer_id: CustomerId,
    /// Wall-clock timestamp of the appointment
    pub visited_at: NaiveDateTime,
    /// Number of billable units delivered
    pub units: i32,
    pub note: Option<String>,
}

impl Visit {
    /// Calendar day of the visit; rate resolution and the once-per-day
    /// travel charge both operate on this.
    pub fn day(&self) -> NaiveDate {
        self.visited_at.date()
    }
}
