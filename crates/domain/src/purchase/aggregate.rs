//! Purchase transaction aggregate implementation.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};

use crate::error::ValidationError;
use crate::store::Store;

use super::{LineItem, LineItemId, Price, PurchaseTransactionId, PurchaseTransactionStripped, StoreId};

/// Purchase transaction aggregate root.
///
/// Owns an ordered list of line items, an optional reference to the store the
/// purchase was made at, and the purchase date. All changes go through the
/// methods below, which keep line item ids unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTransaction {
    /// Assigned at construction, never changes.
    id: PurchaseTransactionId,

    purchase_date: NaiveDate,

    /// Reference only; stores are not owned by the transaction.
    store_id: Option<StoreId>,

    /// In insertion order. Ids are unique.
    line_items: Vec<LineItem>,
}

impl PurchaseTransaction {
    /// Creates a new, empty transaction dated today (UTC).
    pub fn create() -> Self {
        Self {
            id: PurchaseTransactionId::new(),
            purchase_date: Utc::now().date_naive(),
            store_id: None,
            line_items: Vec::new(),
        }
    }

    /// Restores a persisted transaction.
    ///
    /// Intended for storage adapters. Fails if two line items share an id.
    pub fn rehydrate(
        id: PurchaseTransactionId,
        purchase_date: NaiveDate,
        store_id: Option<StoreId>,
        line_items: Vec<LineItem>,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(line_items.len());
        if let Some(duplicate) = line_items.iter().find(|item| !seen.insert(item.id())) {
            return Err(ValidationError::DuplicateLineItem(duplicate.id()));
        }

        Ok(Self {
            id,
            purchase_date,
            store_id,
            line_items,
        })
    }
}

// Query methods
impl PurchaseTransaction {
    pub fn id(&self) -> PurchaseTransactionId {
        self.id
    }

    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_date
    }

    pub fn store_id(&self) -> Option<StoreId> {
        self.store_id
    }

    /// Returns the line items in insertion order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Returns a line item by id.
    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id() == id)
    }

    pub fn line_item_count(&self) -> usize {
        self.line_items.len()
    }

    /// Returns the sum of all line item prices.
    pub fn total_price(&self) -> Price {
        self.line_items
            .iter()
            .fold(Price::zero(), |total, item| total.saturating_add(item.price()))
    }

    /// Checks the rules a transaction must satisfy before it is first persisted.
    pub fn validate_for_creation(&self) -> Result<(), ValidationError> {
        if self.line_items.is_empty() {
            return Err(ValidationError::NoLineItems);
        }
        Ok(())
    }

    /// Builds the list projection of this transaction.
    pub fn stripped(&self, store_name: Option<String>) -> PurchaseTransactionStripped {
        PurchaseTransactionStripped {
            id: self.id,
            purchase_date: self.purchase_date,
            store_id: self.store_id,
            store_name,
            line_item_count: self.line_items.len(),
            total_price: self.total_price(),
        }
    }
}

// Mutation methods
impl PurchaseTransaction {
    /// Points the transaction at another store.
    ///
    /// Taking a [`Store`] rather than a bare id means the caller has already
    /// resolved it through the repository.
    pub fn change_store(&mut self, store: &Store) {
        self.store_id = Some(store.id());
    }

    /// Inserts the line item, or replaces the one with the same id in place.
    pub fn change_line_item(&mut self, line_item: LineItem) {
        match self
            .line_items
            .iter_mut()
            .find(|existing| existing.id() == line_item.id())
        {
            Some(existing) => *existing = line_item,
            None => self.line_items.push(line_item),
        }
    }

    /// Replaces the purchase date. Future dates are accepted.
    pub fn set_purchase_date(&mut self, purchase_date: NaiveDate) {
        self.purchase_date = purchase_date;
    }
}
