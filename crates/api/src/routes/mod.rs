//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod purchase_transactions;
pub mod stores;

use std::str::FromStr;

use domain::{PurchaseTransactionService, UnitOfWork};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<U: UnitOfWork> {
    pub service: PurchaseTransactionService<U>,
}

/// Parses a typed id from a path segment or request field.
pub(crate) fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, ApiError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}
