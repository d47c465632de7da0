//! Store registration and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{CreateStore, Store, StoreId, UnitOfWork};
use serde::{Deserialize, Serialize};

use super::purchase_transactions::CreatedResponse;
use super::{AppState, parse_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id().to_string(),
            name: store.name().to_string(),
        }
    }
}

/// POST /api/stores
#[tracing::instrument(skip(state, req))]
pub async fn create<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = state.service.create_store(CreateStore::new(req.name)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

/// GET /api/stores: every store, ordered by name.
#[tracing::instrument(skip(state))]
pub async fn list<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
) -> Result<Json<Vec<StoreResponse>>, ApiError> {
    let stores = state.service.get_all_stores().await?;
    Ok(Json(stores.into_iter().map(Into::into).collect()))
}

/// GET /api/stores/{id}
#[tracing::instrument(skip(state))]
pub async fn get<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<StoreResponse>, ApiError> {
    let id: StoreId = parse_id("id", &id)?;
    Ok(Json(state.service.get_store(id).await?.into()))
}
