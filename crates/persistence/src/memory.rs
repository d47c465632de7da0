use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::repository::Result;
use domain::{
    DomainError, LineItem, LineItemId, PurchaseTransaction, PurchaseTransactionId,
    PurchaseTransactionRepository, PurchaseTransactionRepositoryExt, PurchaseTransactionStripped,
    Store, StoreId, TransactionScope, UnitOfWork,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::conflict;

#[derive(Debug, Clone, Default)]
struct Tables {
    transactions: BTreeMap<PurchaseTransactionId, PurchaseTransaction>,
    stores: BTreeMap<StoreId, Store>,
}

/// In-memory unit of work for tests and local runs.
///
/// Scopes are serialized: a scope holds the lock on the committed tables for
/// its whole lifetime and works on a private copy, which replaces the
/// committed tables on commit.
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryUnitOfWork {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed purchase transactions.
    pub async fn transaction_count(&self) -> usize {
        self.tables.lock().await.transactions.len()
    }

    /// Returns the number of committed stores.
    pub async fn store_count(&self) -> usize {
        self.tables.lock().await.stores.len()
    }

    /// Clears all committed data.
    pub async fn clear(&self) {
        let mut tables = self.tables.lock().await;
        tables.transactions.clear();
        tables.stores.clear();
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    type Scope = InMemoryScope;

    async fn begin(&self) -> Result<InMemoryScope> {
        let committed = self.tables.clone().lock_owned().await;
        let pending = committed.clone();
        Ok(InMemoryScope { committed, pending })
    }
}

/// A scope over [`InMemoryUnitOfWork`]. Writes stay private until commit.
pub struct InMemoryScope {
    committed: OwnedMutexGuard<Tables>,
    pending: Tables,
}

impl InMemoryScope {
    fn stored_mut(&mut self, id: PurchaseTransactionId) -> Result<&mut PurchaseTransaction> {
        self.pending
            .transactions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("PurchaseTransaction", id))
    }

    /// Fails if the line item id is already stored under another transaction.
    fn ensure_line_item_unowned(
        &self,
        owner: PurchaseTransactionId,
        line_item: LineItemId,
    ) -> Result<()> {
        let foreign = self
            .pending
            .transactions
            .values()
            .filter(|t| t.id() != owner)
            .any(|t| t.line_item(line_item).is_some());
        if foreign {
            return Err(conflict("LineItem", line_item));
        }
        Ok(())
    }
}

#[async_trait]
impl PurchaseTransactionRepository for InMemoryScope {
    async fn add_purchase_transaction(&mut self, transaction: &PurchaseTransaction) -> Result<()> {
        if self.pending.transactions.contains_key(&transaction.id()) {
            return Err(conflict("PurchaseTransaction", transaction.id()));
        }
        if let Some(store_id) = transaction.store_id()
            && !self.pending.stores.contains_key(&store_id)
        {
            return Err(DomainError::not_found("Store", store_id));
        }
        for item in transaction.line_items() {
            self.ensure_line_item_unowned(transaction.id(), item.id())?;
        }

        self.pending
            .transactions
            .insert(transaction.id(), transaction.clone());
        tracing::debug!(transaction_id = %transaction.id(), "staged purchase transaction");
        Ok(())
    }

    async fn exists(&mut self, id: PurchaseTransactionId) -> Result<bool> {
        Ok(self.pending.transactions.contains_key(&id))
    }

    async fn load_purchase_transaction(
        &mut self,
        id: PurchaseTransactionId,
    ) -> Result<PurchaseTransaction> {
        self.pending
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("PurchaseTransaction", id))
    }

    async fn get_all_purchase_transactions(&mut self) -> Result<Vec<PurchaseTransactionStripped>> {
        let stores = &self.pending.stores;
        Ok(self
            .pending
            .transactions
            .values()
            .map(|transaction| {
                let store_name = transaction
                    .store_id()
                    .and_then(|id| stores.get(&id))
                    .map(|store| store.name().to_string());
                transaction.stripped(store_name)
            })
            .collect())
    }

    async fn get_store(&mut self, id: StoreId) -> Result<Store> {
        self.pending
            .stores
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Store", id))
    }

    async fn add_store(&mut self, store: &Store) -> Result<()> {
        if self.pending.stores.contains_key(&store.id()) {
            return Err(conflict("Store", store.id()));
        }
        self.pending.stores.insert(store.id(), store.clone());
        Ok(())
    }

    async fn get_all_stores(&mut self) -> Result<Vec<Store>> {
        let mut stores: Vec<Store> = self.pending.stores.values().cloned().collect();
        stores.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        Ok(stores)
    }

    async fn change_store(
        &mut self,
        transaction: &PurchaseTransaction,
        store_id: StoreId,
    ) -> Result<()> {
        let store = self.get_store(store_id).await?;
        self.stored_mut(transaction.id())?.change_store(&store);
        Ok(())
    }

    async fn change_line_item(
        &mut self,
        transaction: &PurchaseTransaction,
        line_item: &LineItem,
    ) -> Result<()> {
        self.ensure_exists(transaction.id()).await?;
        self.ensure_line_item_unowned(transaction.id(), line_item.id())?;
        self.stored_mut(transaction.id())?
            .change_line_item(line_item.clone());
        Ok(())
    }

    async fn change_purchase_date(
        &mut self,
        transaction: &PurchaseTransaction,
        purchase_date: NaiveDate,
    ) -> Result<()> {
        self.stored_mut(transaction.id())?
            .set_purchase_date(purchase_date);
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for InMemoryScope {
    async fn commit(mut self) -> Result<()> {
        *self.committed = std::mem::take(&mut self.pending);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
