//! Rate ledger handlers

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use core_kernel::CustomerId;

use crate::dto::rates::{CorrectRateRequest, RateConditionResponse, VersionRateRequest};
use crate::{error::ApiError, AppState};

/// Versions a customer's rate: closes the current open condition and opens
/// a new one starting at `valid_from`. Rejects with 409 when `valid_from`
/// would create a retroactive overlap.
pub async fn version_rate(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(request): Json<VersionRateRequest>,
) -> Result<Json<RateConditionResponse>, ApiError> {
    request.validate()?;
    let terms = request.terms.into_terms()?;

    let condition = state
        .engine
        .version_rate(CustomerId::new(customer_id), terms, request.valid_from)
        .await?;

    Ok(Json(condition.into()))
}

/// Corrects a typo in the current open condition without creating history
pub async fn correct_rate(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(request): Json<CorrectRateRequest>,
) -> Result<Json<RateConditionResponse>, ApiError> {
    request.validate()?;
    let terms = request.terms.into_terms()?;

    let condition = state
        .engine
        .correct_rate(CustomerId::new(customer_id), terms)
        .await?;

    Ok(Json(condition.into()))
}
