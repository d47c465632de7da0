//! Domain layer for purchase transaction tracking.
//!
//! This crate provides:
//! - Typed identifiers and the `Price` value object
//! - `LineItem` and its validating builder
//! - The `PurchaseTransaction` aggregate root and the `Store` reference entity
//! - The repository and unit-of-work contracts storage adapters implement
//! - `PurchaseTransactionService`, which runs commands inside a unit of work

pub mod error;
pub mod purchase;
pub mod repository;
pub mod store;

pub use error::{DomainError, ValidationError};
pub use purchase::{
    CreatePurchaseTransaction, CreateStore, LineItem, LineItemBuilder, LineItemId, Price,
    PurchaseTransaction, PurchaseTransactionId, PurchaseTransactionService,
    PurchaseTransactionStripped, SetPurchaseTransactionDate, SetPurchaseTransactionLineItem,
    SetPurchaseTransactionStore, StoreId,
};
pub use repository::{
    PurchaseTransactionRepository, PurchaseTransactionRepositoryExt, TransactionScope, UnitOfWork,
};
pub use store::Store;
