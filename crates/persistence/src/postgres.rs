use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::repository::Result;
use domain::{
    DomainError, LineItem, LineItemId, Price, PurchaseTransaction, PurchaseTransactionId,
    PurchaseTransactionRepository, PurchaseTransactionStripped, Store, StoreId, TransactionScope,
    UnitOfWork,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{StorageError, conflict, database};

const TRANSACTION_PKEY: &str = "purchase_transactions_pkey";
const STORE_PKEY: &str = "stores_pkey";
const LINE_ITEM_PKEY: &str = "line_items_pkey";

/// PostgreSQL-backed unit of work. Every scope is one database transaction.
#[derive(Clone)]
pub struct PostgresUnitOfWork {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresUnitOfWork {
    /// Wraps an existing pool. Statements inside a scope may run for at most
    /// `timeout`.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Opens a pool against `url`. Waiting for a free connection is bounded
    /// by the same `timeout` applied to statements.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> std::result::Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(url)
            .await?;
        Ok(Self::new(pool, timeout))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), StorageError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    type Scope = PostgresScope;

    async fn begin(&self) -> Result<PostgresScope> {
        let mut tx = self.pool.begin().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => StorageError::Timeout(self.timeout).into(),
            other => database(other),
        })?;

        // SET does not accept bind parameters.
        let statement = format!("SET LOCAL statement_timeout = {}", self.timeout.as_millis());
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(database)?;

        Ok(PostgresScope { tx })
    }
}

/// A scope over [`PostgresUnitOfWork`]. Dropping it rolls the database
/// transaction back.
pub struct PostgresScope {
    tx: Transaction<'static, Postgres>,
}

impl PostgresScope {
    async fn store_exists(&mut self, id: StoreId) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(database)
    }

    /// Locks the transaction row until the scope ends, so concurrent line
    /// item writes to one transaction run one after another.
    async fn lock_transaction(&mut self, id: PurchaseTransactionId) -> Result<()> {
        sqlx::query("SELECT id FROM purchase_transactions WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(database)?
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("PurchaseTransaction", id))
    }

    async fn load_line_items(&mut self, id: PurchaseTransactionId) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, price_cents
            FROM line_items
            WHERE purchase_transaction_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_line_item).collect()
    }
}

fn row_to_line_item(row: &PgRow) -> Result<LineItem> {
    let id = LineItemId::from_uuid(row.try_get::<Uuid, _>("id").map_err(database)?);
    let price = Price::from_cents(row.try_get("price_cents").map_err(database)?)?;
    Ok(LineItem::rehydrate(id, price))
}

fn row_to_stripped(row: &PgRow) -> Result<PurchaseTransactionStripped> {
    let store_id: Option<Uuid> = row.try_get("store_id").map_err(database)?;
    let line_item_count: i64 = row.try_get("line_item_count").map_err(database)?;

    Ok(PurchaseTransactionStripped {
        id: PurchaseTransactionId::from_uuid(row.try_get("id").map_err(database)?),
        purchase_date: row.try_get("purchase_date").map_err(database)?,
        store_id: store_id.map(StoreId::from_uuid),
        store_name: row.try_get("store_name").map_err(database)?,
        line_item_count: usize::try_from(line_item_count).unwrap_or_default(),
        total_price: Price::from_cents(row.try_get("total_cents").map_err(database)?)?,
    })
}

fn row_to_store(row: &PgRow) -> Result<Store> {
    Ok(Store::rehydrate(
        StoreId::from_uuid(row.try_get("id").map_err(database)?),
        row.try_get("name").map_err(database)?,
    ))
}

/// Maps a unique violation on `constraint` to `AlreadyExists`.
fn duplicate_as(
    constraint: &'static str,
    entity: &'static str,
    id: impl ToString,
) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.constraint() == Some(constraint)
        {
            return conflict(entity, id);
        }
        database(e)
    }
}

#[async_trait]
impl PurchaseTransactionRepository for PostgresScope {
    #[tracing::instrument(skip(self, transaction), fields(transaction_id = %transaction.id()))]
    async fn add_purchase_transaction(&mut self, transaction: &PurchaseTransaction) -> Result<()> {
        if self.exists(transaction.id()).await? {
            return Err(conflict("PurchaseTransaction", transaction.id()));
        }
        if let Some(store_id) = transaction.store_id()
            && !self.store_exists(store_id).await?
        {
            return Err(DomainError::not_found("Store", store_id));
        }

        sqlx::query(
            r#"
            INSERT INTO purchase_transactions (id, purchase_date, store_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(transaction.id().as_uuid())
        .bind(transaction.purchase_date())
        .bind(transaction.store_id().map(|id| id.as_uuid()))
        .execute(&mut *self.tx)
        .await
        .map_err(duplicate_as(
            TRANSACTION_PKEY,
            "PurchaseTransaction",
            transaction.id(),
        ))?;

        for (position, item) in transaction.line_items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO line_items (id, purchase_transaction_id, position, price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(item.id().as_uuid())
            .bind(transaction.id().as_uuid())
            .bind(position as i32)
            .bind(item.price().cents())
            .execute(&mut *self.tx)
            .await
            .map_err(duplicate_as(LINE_ITEM_PKEY, "LineItem", item.id()))?;
        }

        tracing::debug!(
            line_items = transaction.line_item_count(),
            "inserted purchase transaction"
        );
        Ok(())
    }

    async fn exists(&mut self, id: PurchaseTransactionId) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM purchase_transactions WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(database)
    }

    async fn load_purchase_transaction(
        &mut self,
        id: PurchaseTransactionId,
    ) -> Result<PurchaseTransaction> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT purchase_date, store_id
            FROM purchase_transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(database)?;

        let Some(row) = row else {
            return Err(DomainError::not_found("PurchaseTransaction", id));
        };
        let purchase_date: NaiveDate = row.try_get("purchase_date").map_err(database)?;
        let store_id: Option<Uuid> = row.try_get("store_id").map_err(database)?;

        let line_items = self.load_line_items(id).await?;
        Ok(PurchaseTransaction::rehydrate(
            id,
            purchase_date,
            store_id.map(StoreId::from_uuid),
            line_items,
        )?)
    }

    async fn get_all_purchase_transactions(&mut self) -> Result<Vec<PurchaseTransactionStripped>> {
        let rows = sqlx::query(
            r#"
            SELECT pt.id,
                   pt.purchase_date,
                   pt.store_id,
                   s.name AS store_name,
                   COUNT(li.id) AS line_item_count,
                   COALESCE(SUM(li.price_cents), 0)::BIGINT AS total_cents
            FROM purchase_transactions pt
            LEFT JOIN stores s ON s.id = pt.store_id
            LEFT JOIN line_items li ON li.purchase_transaction_id = pt.id
            GROUP BY pt.id, s.name
            ORDER BY pt.id ASC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_stripped).collect()
    }

    async fn get_store(&mut self, id: StoreId) -> Result<Store> {
        let row = sqlx::query("SELECT id, name FROM stores WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(database)?;

        match row {
            Some(row) => row_to_store(&row),
            None => Err(DomainError::not_found("Store", id)),
        }
    }

    async fn add_store(&mut self, store: &Store) -> Result<()> {
        sqlx::query("INSERT INTO stores (id, name) VALUES ($1, $2)")
            .bind(store.id().as_uuid())
            .bind(store.name())
            .execute(&mut *self.tx)
            .await
            .map_err(duplicate_as(STORE_PKEY, "Store", store.id()))?;
        Ok(())
    }

    async fn get_all_stores(&mut self) -> Result<Vec<Store>> {
        let rows = sqlx::query("SELECT id, name FROM stores ORDER BY name ASC, id ASC")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(database)?;

        rows.iter().map(row_to_store).collect()
    }

    async fn change_store(
        &mut self,
        transaction: &PurchaseTransaction,
        store_id: StoreId,
    ) -> Result<()> {
        if !self.store_exists(store_id).await? {
            return Err(DomainError::not_found("Store", store_id));
        }

        let updated = sqlx::query("UPDATE purchase_transactions SET store_id = $2 WHERE id = $1")
            .bind(transaction.id().as_uuid())
            .bind(store_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(database)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::not_found("PurchaseTransaction", transaction.id()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, transaction, line_item), fields(transaction_id = %transaction.id(), line_item_id = %line_item.id()))]
    async fn change_line_item(
        &mut self,
        transaction: &PurchaseTransaction,
        line_item: &LineItem,
    ) -> Result<()> {
        self.lock_transaction(transaction.id()).await?;

        // New items go after the last stored position; existing ones keep theirs.
        let written = sqlx::query(
            r#"
            INSERT INTO line_items (id, purchase_transaction_id, position, price_cents)
            VALUES (
                $1,
                $2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM line_items WHERE purchase_transaction_id = $2),
                $3
            )
            ON CONFLICT (id) DO UPDATE SET price_cents = EXCLUDED.price_cents
            WHERE line_items.purchase_transaction_id = EXCLUDED.purchase_transaction_id
            "#,
        )
        .bind(line_item.id().as_uuid())
        .bind(transaction.id().as_uuid())
        .bind(line_item.price().cents())
        .execute(&mut *self.tx)
        .await
        .map_err(database)?;

        if written.rows_affected() == 0 {
            // The id belongs to a line item of another transaction.
            return Err(conflict("LineItem", line_item.id()));
        }
        Ok(())
    }

    async fn change_purchase_date(
        &mut self,
        transaction: &PurchaseTransaction,
        purchase_date: NaiveDate,
    ) -> Result<()> {
        let updated =
            sqlx::query("UPDATE purchase_transactions SET purchase_date = $2 WHERE id = $1")
                .bind(transaction.id().as_uuid())
                .bind(purchase_date)
                .execute(&mut *self.tx)
                .await
                .map_err(database)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::not_found("PurchaseTransaction", transaction.id()));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for PostgresScope {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(database)
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.map_err(database)
    }
}
