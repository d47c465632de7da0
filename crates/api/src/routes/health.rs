//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{TransactionScope, UnitOfWork};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: opens and rolls back a storage scope. Answers 503 when the
/// backing store cannot be reached.
pub async fn check<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = match state.service.unit_of_work().begin().await {
        Ok(scope) => scope.rollback().await,
        Err(err) => Err(err),
    };

    match probe {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                }),
            )
        }
    }
}
