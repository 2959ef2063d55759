//! API error handling
//!
//! Maps the engine's error taxonomy onto HTTP status codes. Business
//! errors keep their specific reason in the response body; store faults
//! that survived the engine's retries surface as 500/503 without leaking
//! query details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_billing::{BillingError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invoice locked: {0}")]
    Locked(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No applicable rate: {0}")]
    NoApplicableRate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Locked(msg) => (StatusCode::CONFLICT, "locked", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::NoApplicableRate(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "no_applicable_rate", msg.clone())
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match &err {
            BillingError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BillingError::Locked(_) => ApiError::Locked(err.to_string()),
            BillingError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            BillingError::NoApplicableRate { .. } => ApiError::NoApplicableRate(err.to_string()),
            BillingError::InvalidRange(_) => ApiError::BadRequest(err.to_string()),
            BillingError::Store(store) => match store {
                StoreError::Unavailable(_) | StoreError::Serialization(_) => {
                    ApiError::Unavailable("database temporarily unavailable".to_string())
                }
                StoreError::Internal(_) => {
                    ApiError::Internal("database operation failed".to_string())
                }
            },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{CustomerId, InvoiceNumber};

    #[test]
    fn test_locked_maps_to_conflict_status() {
        let err: ApiError =
            BillingError::Locked(InvoiceNumber::from_raw("AB25-01")).into();
        assert!(matches!(err, ApiError::Locked(_)));
    }

    #[test]
    fn test_no_applicable_rate_is_unprocessable() {
        let err: ApiError = BillingError::NoApplicableRate {
            customer: CustomerId::new(1),
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        }
        .into();
        assert!(matches!(err, ApiError::NoApplicableRate(_)));
    }

    #[test]
    fn test_transient_store_error_is_unavailable() {
        let err: ApiError =
            BillingError::Store(StoreError::unavailable("connection refused")).into();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }
}
