//! HTTP API Layer
//!
//! REST surface for the billing engine using Axum. The surrounding form
//! layer is expected to be a thin client of these endpoints; everything
//! with an invariant lives below, in `domain_billing`.
//!
//! # Endpoints
//!
//! - `POST /api/v1/billing/preview` - compute a snapshot without booking
//! - `POST /api/v1/billing/invoices` - compute and book in one step
//! - `GET  /api/v1/invoices/unpaid` - unpaid invoices, newest first
//! - `POST /api/v1/invoices/:number/payment` - mark paid (one-way)
//! - `POST /api/v1/customers/:id/rates` - version a rate
//! - `PUT  /api/v1/customers/:id/rates/current` - correct a typo in place
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::BillingEngine;
use infra_db::{PgCustomerStore, PgInvoiceStore, PgRateStore, PgVisitStore};

use crate::config::ApiConfig;
use crate::handlers::{billing, health, invoices, rates};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BillingEngine>,
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let engine = Arc::new(BillingEngine::new(
        Arc::new(PgCustomerStore::new(pool.clone())),
        Arc::new(PgVisitStore::new(pool.clone())),
        Arc::new(PgRateStore::new(pool.clone())),
        Arc::new(PgInvoiceStore::new(pool.clone())),
    ));

    let state = AppState {
        engine,
        pool,
        config,
    };

    // Public routes (no state-dependent checks)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Billing routes
    let billing_routes = Router::new()
        .route("/preview", post(billing::preview_billing))
        .route("/invoices", post(billing::generate_invoice));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/unpaid", get(invoices::list_unpaid))
        .route("/:number/payment", post(invoices::mark_paid));

    // Rate ledger routes
    let rate_routes = Router::new()
        .route("/:id/rates", post(rates::version_rate))
        .route("/:id/rates/current", put(rates::correct_rate));

    let api_routes = Router::new()
        .nest("/billing", billing_routes)
        .nest("/invoices", invoice_routes)
        .nest("/customers", rate_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
