//! HTTP API server for purchase transaction tracking.
//!
//! Exposes the purchase transaction service over JSON endpoints, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use domain::{PurchaseTransactionService, UnitOfWork};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;
use routes::{purchase_transactions, stores};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U: UnitOfWork + 'static>(
    state: Arc<AppState<U>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<U>))
        .route(
            "/api/purchase-transactions",
            get(purchase_transactions::list::<U>).post(purchase_transactions::create::<U>),
        )
        .route(
            "/api/purchase-transactions/purchase-date",
            put(purchase_transactions::set_purchase_date::<U>),
        )
        .route(
            "/api/purchase-transactions/store",
            put(purchase_transactions::set_store::<U>),
        )
        .route(
            "/api/purchase-transactions/line-item",
            put(purchase_transactions::set_line_item::<U>),
        )
        .route(
            "/api/purchase-transactions/{id}",
            get(purchase_transactions::get::<U>),
        )
        .route(
            "/api/stores",
            get(stores::list::<U>).post(stores::create::<U>),
        )
        .route("/api/stores/{id}", get(stores::get::<U>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a unit of work into the shared application state.
pub fn create_default_state<U: UnitOfWork + 'static>(unit_of_work: U) -> Arc<AppState<U>> {
    Arc::new(AppState {
        service: PurchaseTransactionService::new(unit_of_work),
    })
}
