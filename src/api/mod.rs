//! HTTP surface: the payment functions and a health check

pub mod health;
pub mod payments;
pub mod transactions;

use crate::middleware::cors::preflight;
use crate::middleware::logging::{request_logging_middleware, UuidRequestId};
use crate::services::PaymentProcessor;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

pub const PROCESS_PAYMENT_PATH: &str = "/functions/v1/process-payment";
pub const TRANSACTIONS_PATH: &str = "/functions/v1/transactions";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<PaymentProcessor>,
    /// Only set when transactions are written through Postgres directly
    pub db_pool: Option<PgPool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            PROCESS_PAYMENT_PATH,
            post(payments::process_payment).options(preflight),
        )
        .route(
            TRANSACTIONS_PATH,
            get(transactions::list_transactions).options(preflight),
        )
        .route(HEALTH_PATH, get(health::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
