//! Invoice handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::InvoiceNumber;

use crate::dto::invoices::{MarkPaidResponse, OpenInvoiceResponse};
use crate::{error::ApiError, AppState};

/// Lists unpaid invoices, newest first
pub async fn list_unpaid(
    State(state): State<AppState>,
) -> Result<Json<Vec<OpenInvoiceResponse>>, ApiError> {
    let invoices = state.engine.list_unpaid().await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Records a payment, freezing the invoice forever.
///
/// One-way: there is no endpoint to unmark a paid invoice.
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<MarkPaidResponse>, ApiError> {
    let number = InvoiceNumber::from_raw(number);
    state.engine.mark_paid(&number).await?;

    Ok(Json(MarkPaidResponse {
        number: number.to_string(),
        paid: true,
    }))
}
