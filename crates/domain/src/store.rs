//! Store reference entity.

use serde::Serialize;

use crate::error::ValidationError;
use crate::purchase::StoreId;

/// A shop where purchases are made.
///
/// Stores are referenced by purchase transactions through their id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    id: StoreId,
    name: String,
}

impl Store {
    /// Creates a new store with a fresh id. The name is trimmed and must not be blank.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::StoreNameRequired);
        }
        Ok(Self {
            id: StoreId::new(),
            name,
        })
    }

    /// Restores a persisted store.
    pub fn rehydrate(id: StoreId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
