//! Invoice records and the paid-lock state machine
//!
//! A stored invoice moves through exactly two states: `Draft` (may be
//! overwritten by a resubmission) and `Paid` (frozen forever). There is no
//! transition out of `Paid`; re-opening a paid invoice is a manual data
//! correction outside this engine.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{CustomerId, InvoiceNumber, Money, RateConditionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::snapshot::BillingSnapshot;

/// Settlement state of a stored invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Unpaid; the register may overwrite the row on resubmission
    Draft,
    /// Paid; terminal, every write to the row is rejected
    Paid,
}

impl InvoiceStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    /// Returns true while the register is still allowed to replace the
    /// invoice's financial content.
    pub fn is_mutable(&self) -> bool {
        matches!(self, InvoiceStatus::Draft)
    }
}

/// The persist shape the register writes for a submitted snapshot.
///
/// Besides the total, the row freezes the pricing fields of the condition
/// the snapshot was computed with, so the invoice stays auditable even
/// after the customer's rates are versioned again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub number: InvoiceNumber,
    pub customer_id: CustomerId,
    pub rate_condition_id: RateConditionId,
    pub issued_on: NaiveDate,
    pub total: Money,
    pub price_per_unit: Money,
    pub unit_duration_min: i32,
    pub travel_distance_km: Decimal,
    pub travel_rate_per_km: Money,
}

impl NewInvoice {
    /// Extracts the persist shape from a computed snapshot.
    ///
    /// The frozen pricing fields come from the snapshot's first visit and
    /// travel lines, which carry the terms of the earliest billed visit's
    /// condition. A snapshot always has at least one of each (otherwise
    /// the calculator reports no applicable rate), but absent lines fall
    /// back to zero rather than panicking.
    pub fn from_snapshot(snapshot: &BillingSnapshot) -> Self {
        let (price_per_unit, unit_duration_min) = snapshot
            .visit_lines
            .first()
            .map(|l| (l.price_per_unit, l.unit_duration_min))
            .unwrap_or((Money::zero(), 0));

        let (travel_distance_km, travel_rate_per_km) = snapshot
            .travel_lines
            .first()
            .map(|l| (l.distance_km, l.rate_per_km))
            .unwrap_or((Decimal::ZERO, Money::zero()));

        Self {
            number: snapshot.invoice_number.clone(),
            customer_id: snapshot.customer_id,
            rate_condition_id: snapshot.rate_condition_id,
            issued_on: snapshot.issued_on,
            total: snapshot.total,
            price_per_unit,
            unit_duration_min,
            travel_distance_km,
            travel_rate_per_km,
        }
    }
}

/// A stored invoice as read back from the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: InvoiceNumber,
    pub customer_id: CustomerId,
    pub rate_condition_id: RateConditionId,
    pub issued_on: NaiveDate,
    pub total: Money,
    pub price_per_unit: Money,
    pub unit_duration_min: i32,
    pub travel_distance_km: Decimal,
    pub travel_rate_per_km: Money,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

/// Summary row of the unpaid-invoice listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    pub number: InvoiceNumber,
    pub issued_on: NaiveDate,
    pub customer_name: String,
    pub total: Money,
}
