//! Persistence contract for purchase transactions.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DomainError;
use crate::purchase::{
    LineItem, PurchaseTransaction, PurchaseTransactionId, PurchaseTransactionStripped, StoreId,
};
use crate::store::Store;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Repository operations for purchase transactions and stores.
///
/// Implementations run every call inside the transaction scope they belong to
/// (see [`TransactionScope`]); nothing is visible to other scopes until the
/// scope commits.
///
/// Writes come in two granularities: [`add_purchase_transaction`] stores a
/// whole aggregate, while the `change_*` methods touch a single field or line
/// item of an aggregate that already exists.
///
/// [`add_purchase_transaction`]: PurchaseTransactionRepository::add_purchase_transaction
#[async_trait]
pub trait PurchaseTransactionRepository: Send {
    /// Persists a new transaction together with all of its line items.
    ///
    /// Fails with `AlreadyExists` if a transaction with the same id is
    /// already stored; the stored data is left untouched.
    async fn add_purchase_transaction(&mut self, transaction: &PurchaseTransaction) -> Result<()>;

    /// Returns whether a transaction with this id is stored.
    async fn exists(&mut self, id: PurchaseTransactionId) -> Result<bool>;

    /// Loads a transaction with all of its line items.
    ///
    /// Fails with `NotFound` if the id is unknown.
    async fn load_purchase_transaction(
        &mut self,
        id: PurchaseTransactionId,
    ) -> Result<PurchaseTransaction>;

    /// Returns the list projection of every transaction, ordered by id
    /// (which is creation order).
    async fn get_all_purchase_transactions(&mut self) -> Result<Vec<PurchaseTransactionStripped>>;

    /// Loads a transaction with every owned entity populated.
    async fn get_purchase_transaction_full(
        &mut self,
        id: PurchaseTransactionId,
    ) -> Result<PurchaseTransaction> {
        self.load_purchase_transaction(id).await
    }

    /// Looks up a store. Fails with `NotFound` if the id is unknown.
    async fn get_store(&mut self, id: StoreId) -> Result<Store>;

    /// Registers a new store. Fails with `AlreadyExists` on a duplicate id.
    async fn add_store(&mut self, store: &Store) -> Result<()>;

    /// Returns every store, ordered by name then id.
    async fn get_all_stores(&mut self) -> Result<Vec<Store>>;

    /// Updates the store reference of a stored transaction.
    ///
    /// The store is looked up inside the same scope before writing; an unknown
    /// store or transaction fails with `NotFound` and nothing is written.
    async fn change_store(
        &mut self,
        transaction: &PurchaseTransaction,
        store_id: StoreId,
    ) -> Result<()>;

    /// Inserts or replaces one line item of a stored transaction, leaving the
    /// other line items untouched.
    async fn change_line_item(
        &mut self,
        transaction: &PurchaseTransaction,
        line_item: &LineItem,
    ) -> Result<()>;

    /// Updates the purchase date of a stored transaction.
    async fn change_purchase_date(
        &mut self,
        transaction: &PurchaseTransaction,
        purchase_date: NaiveDate,
    ) -> Result<()>;
}

/// A repository bound to one unit of work.
///
/// Dropping a scope without calling [`commit`](TransactionScope::commit)
/// discards every write made through it.
#[async_trait]
pub trait TransactionScope: PurchaseTransactionRepository {
    /// Makes all writes of this scope durable and visible.
    async fn commit(self) -> Result<()>;

    /// Discards all writes of this scope.
    async fn rollback(self) -> Result<()>;
}

/// Opens transaction scopes against a backing store.
///
/// Implementations must be thread-safe; each request opens its own scope.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Scope: TransactionScope;

    /// Begins a new scope.
    async fn begin(&self) -> Result<Self::Scope>;
}

/// Extension methods available on every repository.
#[async_trait]
pub trait PurchaseTransactionRepositoryExt: PurchaseTransactionRepository {
    /// Fails with `NotFound` unless the transaction is stored.
    async fn ensure_exists(&mut self, id: PurchaseTransactionId) -> Result<()> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("PurchaseTransaction", id))
        }
    }
}

impl<T: PurchaseTransactionRepository + ?Sized> PurchaseTransactionRepositoryExt for T {}
