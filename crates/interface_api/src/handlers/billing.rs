//! Billing handlers

use axum::{extract::State, Json};
use validator::Validate;

use core_kernel::{CustomerId, DateRange};

use crate::dto::billing::{BillingOutcomeResponse, ComputeBillingRequest};
use crate::{error::ApiError, AppState};

/// Computes a billing snapshot without persisting anything.
///
/// The UI uses this to preview an invoice before booking it.
pub async fn preview_billing(
    State(state): State<AppState>,
    Json(request): Json<ComputeBillingRequest>,
) -> Result<Json<BillingOutcomeResponse>, ApiError> {
    request.validate()?;
    let range = billing_range(&request)?;

    let outcome = state
        .engine
        .compute_billing(CustomerId::new(request.customer_id), range)
        .await?;

    Ok(Json(outcome.into()))
}

/// Computes a snapshot and books it in one step: the combined flow behind
/// the UI's "create invoice" action. Rejects with 409 when the derived
/// invoice number is already locked by a payment.
pub async fn generate_invoice(
    State(state): State<AppState>,
    Json(request): Json<ComputeBillingRequest>,
) -> Result<Json<BillingOutcomeResponse>, ApiError> {
    request.validate()?;
    let range = billing_range(&request)?;

    let outcome = state
        .engine
        .generate_invoice(CustomerId::new(request.customer_id), range)
        .await?;

    Ok(Json(outcome.into()))
}

fn billing_range(request: &ComputeBillingRequest) -> Result<DateRange, ApiError> {
    DateRange::new(request.start, request.end)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}
