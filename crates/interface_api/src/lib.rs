//! HTTP API Layer
//!
//! This crate provides the REST API for the billing engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for clients, quotations, invoices, payments
//! - **Middleware**: Authentication, authorization, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Notify**: Outbound email/PDF delivery, isolated from status changes
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config, notifier);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{clients, health, invoices, payments, quotations};
use crate::middleware::{audit_middleware, auth_middleware};
use crate::notify::DocumentNotifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub notifier: Arc<dyn DocumentNotifier>,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
/// * `notifier` - Outbound document delivery port
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(
    pool: PgPool,
    config: ApiConfig,
    notifier: Arc<dyn DocumentNotifier>,
) -> Router {
    let state = AppState { pool, config, notifier };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Client routes
    let client_routes = Router::new()
        .route("/", post(clients::create_client))
        .route("/", get(clients::list_clients))
        .route("/:id", get(clients::get_client))
        .route("/:id", put(clients::update_client))
        .route("/:id", delete(clients::delete_client));

    // Quotation routes
    let quotation_routes = Router::new()
        .route("/", post(quotations::create_quotation))
        .route("/", get(quotations::list_quotations))
        .route("/:id", get(quotations::get_quotation))
        .route("/:id/items", put(quotations::update_items))
        .route("/:id/send", post(quotations::send_quotation))
        .route("/:id/accept", post(quotations::accept_quotation))
        .route("/:id/reject", post(quotations::reject_quotation))
        .route("/:id/convert", post(quotations::convert_quotation));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice))
        .route("/", get(invoices::list_invoices))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id", delete(invoices::delete_invoice))
        .route("/:id/items", put(invoices::update_items))
        .route("/:id/send", post(invoices::send_invoice))
        .route("/:id/cancel", post(invoices::cancel_invoice))
        .route("/:id/payments", get(invoices::list_payments));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", post(payments::record_payment))
        .route("/:id", get(payments::get_payment))
        .route("/:id", delete(payments::delete_payment));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/quotations", quotation_routes)
        .nest("/invoices", invoice_routes)
        .nest("/payments", payment_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
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
