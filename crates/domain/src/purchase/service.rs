//! Purchase transaction service translating commands into repository calls.

use crate::error::DomainError;
use crate::repository::{PurchaseTransactionRepository, TransactionScope, UnitOfWork};
use crate::store::Store;

use super::{
    CreatePurchaseTransaction, CreateStore, LineItemBuilder, LineItemId, PurchaseTransaction,
    PurchaseTransactionId, PurchaseTransactionStripped, SetPurchaseTransactionDate,
    SetPurchaseTransactionLineItem, SetPurchaseTransactionStore, StoreId,
};

/// Service for managing purchase transactions.
///
/// Every mutating command runs in its own unit-of-work scope and commits once
/// at the end. An error at any step returns before the commit, and the
/// dropped scope discards everything written so far.
pub struct PurchaseTransactionService<U: UnitOfWork> {
    unit_of_work: U,
}

impl<U: UnitOfWork> PurchaseTransactionService<U> {
    /// Creates a new service on top of the given unit of work.
    pub fn new(unit_of_work: U) -> Self {
        Self { unit_of_work }
    }

    /// Returns a reference to the underlying unit of work.
    pub fn unit_of_work(&self) -> &U {
        &self.unit_of_work
    }

    /// Persists a new purchase transaction.
    ///
    /// The transaction must hold at least one line item. If the command names
    /// a store, it must exist.
    #[tracing::instrument(skip(self, cmd), fields(transaction_id = %cmd.transaction.id()))]
    pub async fn create(
        &self,
        cmd: CreatePurchaseTransaction,
    ) -> Result<PurchaseTransactionId, DomainError> {
        let result = self.try_create(cmd).await;
        observe("create", &result);
        result
    }

    async fn try_create(
        &self,
        cmd: CreatePurchaseTransaction,
    ) -> Result<PurchaseTransactionId, DomainError> {
        let CreatePurchaseTransaction {
            mut transaction,
            store_id,
        } = cmd;

        transaction.validate_for_creation()?;

        let mut scope = self.unit_of_work.begin().await?;
        if let Some(store_id) = store_id {
            let store = scope.get_store(store_id).await?;
            transaction.change_store(&store);
        }
        scope.add_purchase_transaction(&transaction).await?;
        scope.commit().await?;

        metrics::counter!("purchase_transactions_created").increment(1);
        tracing::info!(
            line_items = transaction.line_item_count(),
            "purchase transaction created"
        );
        Ok(transaction.id())
    }

    /// Changes the purchase date of a transaction.
    #[tracing::instrument(skip(self))]
    pub async fn set_purchase_date(
        &self,
        cmd: SetPurchaseTransactionDate,
    ) -> Result<(), DomainError> {
        let result = self.try_set_purchase_date(cmd).await;
        observe("set_purchase_date", &result);
        result
    }

    async fn try_set_purchase_date(
        &self,
        cmd: SetPurchaseTransactionDate,
    ) -> Result<(), DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        let mut transaction = scope.load_purchase_transaction(cmd.id).await?;

        transaction.set_purchase_date(cmd.purchase_date);
        scope
            .change_purchase_date(&transaction, transaction.purchase_date())
            .await?;
        scope.commit().await
    }

    /// Points a transaction at another store. Both must exist.
    #[tracing::instrument(skip(self))]
    pub async fn set_store(&self, cmd: SetPurchaseTransactionStore) -> Result<(), DomainError> {
        let result = self.try_set_store(cmd).await;
        observe("set_store", &result);
        result
    }

    async fn try_set_store(&self, cmd: SetPurchaseTransactionStore) -> Result<(), DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        let mut transaction = scope.load_purchase_transaction(cmd.id).await?;
        let store = scope.get_store(cmd.store_id).await?;

        transaction.change_store(&store);
        scope.change_store(&transaction, store.id()).await?;
        scope.commit().await
    }

    /// Adds a line item, or re-prices an existing one.
    ///
    /// Returns the id of the line item that was written.
    #[tracing::instrument(skip(self))]
    pub async fn set_line_item(
        &self,
        cmd: SetPurchaseTransactionLineItem,
    ) -> Result<LineItemId, DomainError> {
        let result = self.try_set_line_item(cmd).await;
        observe("set_line_item", &result);
        result
    }

    async fn try_set_line_item(
        &self,
        cmd: SetPurchaseTransactionLineItem,
    ) -> Result<LineItemId, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        let mut transaction = scope.load_purchase_transaction(cmd.id).await?;

        let line_item = match cmd.line_item_id {
            Some(line_item_id) => transaction
                .line_item(line_item_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("LineItem", line_item_id))?
                .with_price(cmd.price),
            None => LineItemBuilder::line_item(cmd.price).build()?,
        };

        transaction.change_line_item(line_item.clone());
        scope.change_line_item(&transaction, &line_item).await?;
        scope.commit().await?;
        Ok(line_item.id())
    }

    /// Lists every transaction as a stripped projection, in creation order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_purchase_transactions(
        &self,
    ) -> Result<Vec<PurchaseTransactionStripped>, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        scope.get_all_purchase_transactions().await
    }

    /// Loads a transaction with all of its line items.
    #[tracing::instrument(skip(self))]
    pub async fn get_detailed_purchase_transaction(
        &self,
        id: PurchaseTransactionId,
    ) -> Result<PurchaseTransaction, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        scope.get_purchase_transaction_full(id).await
    }

    /// Returns whether a transaction exists.
    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, id: PurchaseTransactionId) -> Result<bool, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        scope.exists(id).await
    }

    /// Registers a new store.
    #[tracing::instrument(skip(self))]
    pub async fn create_store(&self, cmd: CreateStore) -> Result<StoreId, DomainError> {
        let result = self.try_create_store(cmd).await;
        observe("create_store", &result);
        result
    }

    async fn try_create_store(&self, cmd: CreateStore) -> Result<StoreId, DomainError> {
        let store = Store::new(cmd.name)?;

        let mut scope = self.unit_of_work.begin().await?;
        scope.add_store(&store).await?;
        scope.commit().await?;

        metrics::counter!("stores_created").increment(1);
        tracing::info!(store_id = %store.id(), name = store.name(), "store created");
        Ok(store.id())
    }

    /// Looks up a store.
    #[tracing::instrument(skip(self))]
    pub async fn get_store(&self, id: StoreId) -> Result<Store, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        scope.get_store(id).await
    }

    /// Lists every store, ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_stores(&self) -> Result<Vec<Store>, DomainError> {
        let mut scope = self.unit_of_work.begin().await?;
        scope.get_all_stores().await
    }
}

fn observe<T>(command: &'static str, result: &Result<T, DomainError>) {
    if let Err(err) = result {
        metrics::counter!(
            "purchase_commands_failed",
            "command" => command,
            "kind" => err.kind()
        )
        .increment(1);
        tracing::warn!(command, kind = err.kind(), error = %err, "command failed");
    }
}
