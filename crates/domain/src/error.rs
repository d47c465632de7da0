//! Domain error types.

use thiserror::Error;

use crate::purchase::LineItemId;

/// A malformed or missing field, detected while constructing a domain object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A line item was built without a price.
    #[error("Price is required")]
    PriceRequired,

    /// Prices cannot be negative.
    #[error("Invalid price: {cents} cents (must not be negative)")]
    NegativePrice { cents: i64 },

    /// A price string could not be parsed.
    #[error("Invalid price: {0:?}")]
    MalformedPrice(String),

    /// A purchase transaction must contain at least one line item to be created.
    #[error("Purchase transaction has no line items")]
    NoLineItems,

    /// A store needs a non-blank name.
    #[error("Store name is required")]
    StoreNameRequired,

    /// The same line item id appeared twice in one transaction.
    #[error("Duplicate line item: {0}")]
    DuplicateLineItem(LineItemId),
}

/// Errors returned by the repository contract and the application service.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Construction-time validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An entity with the same identity is already persisted.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// The backing store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DomainError {
    /// Builds a `NotFound` error for the given entity kind.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds an `AlreadyExists` error for the given entity kind.
    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        DomainError::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Wraps an adapter error as a persistence failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DomainError::Persistence(Box::new(err))
    }

    /// Short label for the error kind, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::NotFound { .. } => "not_found",
            DomainError::AlreadyExists { .. } => "already_exists",
            DomainError::Persistence(_) => "persistence",
        }
    }
}
