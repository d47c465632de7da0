//! Purchase transaction endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use domain::{
    CreatePurchaseTransaction, LineItem, LineItemBuilder, LineItemId, Price, PurchaseTransaction,
    PurchaseTransactionId, PurchaseTransactionStripped, SetPurchaseTransactionDate,
    SetPurchaseTransactionLineItem, SetPurchaseTransactionStore, StoreId, UnitOfWork,
};
use serde::{Deserialize, Serialize};

use super::{AppState, parse_id};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreatePurchaseTransactionRequest {
    /// Defaults to today (UTC).
    pub purchase_date: Option<NaiveDate>,
    pub store_id: Option<String>,
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct SetPurchaseDateRequest {
    pub id: String,
    pub purchase_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct SetStoreRequest {
    pub id: String,
    pub store_id: String,
}

#[derive(Deserialize)]
pub struct SetLineItemRequest {
    pub id: String,
    /// Omit to add a new line item.
    pub line_item_id: Option<String>,
    pub price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Serialize)]
pub struct LineItemWrittenResponse {
    pub line_item_id: String,
}

#[derive(Serialize)]
pub struct PurchaseTransactionResponse {
    pub id: String,
    pub purchase_date: NaiveDate,
    pub store_id: Option<String>,
    pub line_items: Vec<LineItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct LineItemResponse {
    pub id: String,
    pub price_cents: i64,
    pub price: String,
}

#[derive(Serialize)]
pub struct PurchaseTransactionSummaryResponse {
    pub id: String,
    pub purchase_date: NaiveDate,
    pub store_id: Option<String>,
    pub store_name: Option<String>,
    pub line_item_count: usize,
    pub total_cents: i64,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id().to_string(),
            price_cents: item.price().cents(),
            price: item.price().to_string(),
        }
    }
}

impl From<PurchaseTransaction> for PurchaseTransactionResponse {
    fn from(transaction: PurchaseTransaction) -> Self {
        Self {
            id: transaction.id().to_string(),
            purchase_date: transaction.purchase_date(),
            store_id: transaction.store_id().map(|id| id.to_string()),
            line_items: transaction.line_items().iter().map(Into::into).collect(),
            total_cents: transaction.total_price().cents(),
        }
    }
}

impl From<PurchaseTransactionStripped> for PurchaseTransactionSummaryResponse {
    fn from(stripped: PurchaseTransactionStripped) -> Self {
        Self {
            id: stripped.id.to_string(),
            purchase_date: stripped.purchase_date,
            store_id: stripped.store_id.map(|id| id.to_string()),
            store_name: stripped.store_name,
            line_item_count: stripped.line_item_count,
            total_cents: stripped.total_price.cents(),
        }
    }
}

// -- Handlers --

/// POST /api/purchase-transactions: create a transaction with its line items.
#[tracing::instrument(skip(state, req))]
pub async fn create<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<CreatePurchaseTransactionRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let store_id = req
        .store_id
        .as_deref()
        .map(|raw| parse_id::<StoreId>("store_id", raw))
        .transpose()?;

    let mut transaction = PurchaseTransaction::create();
    if let Some(purchase_date) = req.purchase_date {
        transaction.set_purchase_date(purchase_date);
    }
    for item in &req.line_items {
        let price = Price::from_cents(item.price_cents)?;
        transaction.change_line_item(LineItemBuilder::line_item(price).build()?);
    }

    let mut cmd = CreatePurchaseTransaction::new(transaction);
    if let Some(store_id) = store_id {
        cmd = cmd.at_store(store_id);
    }
    let id = state.service.create(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

/// GET /api/purchase-transactions: list every transaction without line items.
#[tracing::instrument(skip(state))]
pub async fn list<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
) -> Result<Json<Vec<PurchaseTransactionSummaryResponse>>, ApiError> {
    let all = state.service.get_all_purchase_transactions().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// GET /api/purchase-transactions/{id}: load one transaction with its line items.
#[tracing::instrument(skip(state))]
pub async fn get<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseTransactionResponse>, ApiError> {
    let id: PurchaseTransactionId = parse_id("id", &id)?;
    let transaction = state.service.get_detailed_purchase_transaction(id).await?;
    Ok(Json(transaction.into()))
}

/// PUT /api/purchase-transactions/purchase-date
#[tracing::instrument(skip(state, req))]
pub async fn set_purchase_date<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<SetPurchaseDateRequest>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("id", &req.id)?;
    state
        .service
        .set_purchase_date(SetPurchaseTransactionDate::new(id, req.purchase_date))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/purchase-transactions/store
#[tracing::instrument(skip(state, req))]
pub async fn set_store<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<SetStoreRequest>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id("id", &req.id)?;
    let store_id = parse_id("store_id", &req.store_id)?;
    state
        .service
        .set_store(SetPurchaseTransactionStore::new(id, store_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/purchase-transactions/line-item: add or re-price one line item.
#[tracing::instrument(skip(state, req))]
pub async fn set_line_item<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<SetLineItemRequest>,
) -> Result<Json<LineItemWrittenResponse>, ApiError> {
    let id = parse_id("id", &req.id)?;
    let price = Price::from_cents(req.price_cents)?;

    let cmd = match req.line_item_id.as_deref() {
        Some(raw) => {
            let line_item_id: LineItemId = parse_id("line_item_id", raw)?;
            SetPurchaseTransactionLineItem::reprice(id, line_item_id, price)
        }
        None => SetPurchaseTransactionLineItem::add(id, price),
    };
    let line_item_id = state.service.set_line_item(cmd).await?;

    Ok(Json(LineItemWrittenResponse {
        line_item_id: line_item_id.to_string(),
    }))
}
