//! Purchase transaction commands.

use chrono::NaiveDate;

use super::{LineItemId, Price, PurchaseTransaction, PurchaseTransactionId, StoreId};

/// Command to persist a newly built purchase transaction.
#[derive(Debug, Clone)]
pub struct CreatePurchaseTransaction {
    /// The transaction to store. Must pass creation validation.
    pub transaction: PurchaseTransaction,

    /// Store to attach before persisting, if any.
    pub store_id: Option<StoreId>,
}

impl CreatePurchaseTransaction {
    /// Creates a new CreatePurchaseTransaction command without a store.
    pub fn new(transaction: PurchaseTransaction) -> Self {
        Self {
            transaction,
            store_id: None,
        }
    }

    /// Attaches a store to the command.
    pub fn at_store(mut self, store_id: StoreId) -> Self {
        self.store_id = Some(store_id);
        self
    }
}

/// Command to change the purchase date of a transaction.
#[derive(Debug, Clone)]
pub struct SetPurchaseTransactionDate {
    pub id: PurchaseTransactionId,
    pub purchase_date: NaiveDate,
}

impl SetPurchaseTransactionDate {
    pub fn new(id: PurchaseTransactionId, purchase_date: NaiveDate) -> Self {
        Self { id, purchase_date }
    }
}

/// Command to point a transaction at another store.
#[derive(Debug, Clone)]
pub struct SetPurchaseTransactionStore {
    pub id: PurchaseTransactionId,
    pub store_id: StoreId,
}

impl SetPurchaseTransactionStore {
    pub fn new(id: PurchaseTransactionId, store_id: StoreId) -> Self {
        Self { id, store_id }
    }
}

/// Command to add a line item to a transaction or re-price an existing one.
#[derive(Debug, Clone)]
pub struct SetPurchaseTransactionLineItem {
    /// The transaction owning the line item.
    pub id: PurchaseTransactionId,

    /// Existing line item to re-price. `None` adds a new line item.
    pub line_item_id: Option<LineItemId>,

    pub price: Price,
}

impl SetPurchaseTransactionLineItem {
    /// Adds a new line item with the given price.
    pub fn add(id: PurchaseTransactionId, price: Price) -> Self {
        Self {
            id,
            line_item_id: None,
            price,
        }
    }

    /// Replaces the price of an existing line item.
    pub fn reprice(id: PurchaseTransactionId, line_item_id: LineItemId, price: Price) -> Self {
        Self {
            id,
            line_item_id: Some(line_item_id),
            price,
        }
    }
}

/// Command to register a store.
#[derive(Debug, Clone)]
pub struct CreateStore {
    pub name: String,
}

impl CreateStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
