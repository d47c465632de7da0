//! List projection of purchase transactions.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Price, PurchaseTransactionId, StoreId};

/// Read-only summary of a purchase transaction for list views.
///
/// Carries no line item detail and cannot be turned back into an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseTransactionStripped {
    pub id: PurchaseTransactionId,
    pub purchase_date: NaiveDate,
    pub store_id: Option<StoreId>,
    pub store_name: Option<String>,
    pub line_item_count: usize,
    pub total_price: Price,
}
