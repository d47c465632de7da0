//! Line items and their builder.

use serde::Serialize;

use crate::error::ValidationError;

use super::{LineItemId, Price};

/// A single priced entry of a purchase transaction.
///
/// Line items have no public constructor: new items come from
/// [`LineItemBuilder`], which assigns a fresh identity, and persisted items are
/// restored through [`LineItem::rehydrate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    id: LineItemId,
    price: Price,
}

impl LineItem {
    /// Restores a persisted line item with its stored identity.
    ///
    /// Intended for storage adapters only.
    pub fn rehydrate(id: LineItemId, price: Price) -> Self {
        Self { id, price }
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Returns the same line item with a new price. Identity is preserved.
    pub fn with_price(self, price: Price) -> Self {
        Self { price, ..self }
    }
}

/// Builds [`LineItem`]s, requiring a price.
#[derive(Debug, Clone, Default)]
pub struct LineItemBuilder {
    price: Option<Price>,
}

impl LineItemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `LineItemBuilder::new().with_price(price)`.
    pub fn line_item(price: Price) -> Self {
        Self::new().with_price(price)
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Builds the line item with a freshly generated id.
    pub fn build(self) -> Result<LineItem, ValidationError> {
        let price = self.price.ok_or(ValidationError::PriceRequired)?;
        Ok(LineItem {
            id: LineItemId::new(),
            price,
        })
    }
}
