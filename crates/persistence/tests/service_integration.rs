//! Integration tests for the purchase transaction service.
//!
//! These tests drive `PurchaseTransactionService` on top of the in-memory
//! unit of work: creation, partial updates, listing and rollback behaviour.

use std::sync::Arc;

use chrono::NaiveDate;
use domain::{
    CreatePurchaseTransaction, CreateStore, DomainError, LineItemBuilder, Price,
    PurchaseTransaction, PurchaseTransactionId, PurchaseTransactionRepository,
    PurchaseTransactionService, SetPurchaseTransactionDate, SetPurchaseTransactionLineItem,
    SetPurchaseTransactionStore, StoreId, UnitOfWork, ValidationError,
};
use persistence::InMemoryUnitOfWork;

/// Helper to create a test service
fn create_service() -> PurchaseTransactionService<InMemoryUnitOfWork> {
    PurchaseTransactionService::new(InMemoryUnitOfWork::new())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn price(cents: i64) -> Price {
    Price::from_cents(cents).unwrap()
}

fn transaction(purchase_date: NaiveDate, prices: &[i64]) -> PurchaseTransaction {
    let mut transaction = PurchaseTransaction::create();
    transaction.set_purchase_date(purchase_date);
    for &cents in prices {
        transaction.change_line_item(LineItemBuilder::line_item(price(cents)).build().unwrap());
    }
    transaction
}

async fn create(
    service: &PurchaseTransactionService<InMemoryUnitOfWork>,
    transaction: PurchaseTransaction,
) -> PurchaseTransactionId {
    service
        .create(CreatePurchaseTransaction::new(transaction))
        .await
        .unwrap()
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn create_and_read_back() {
        let service = create_service();
        let t1 = transaction(date(2024, 1, 1), &[999]);
        let item_id = t1.line_items()[0].id();

        assert!(!service.exists(t1.id()).await.unwrap());
        let id = create(&service, t1.clone()).await;
        assert_eq!(id, t1.id());
        assert!(service.exists(id).await.unwrap());

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.purchase_date(), date(2024, 1, 1));
        assert_eq!(loaded.line_item_count(), 1);
        assert_eq!(loaded.line_items()[0].id(), item_id);
        assert_eq!(loaded.line_items()[0].price(), price(999));
        assert_eq!(loaded.store_id(), None);
    }

    #[tokio::test]
    async fn change_purchase_date() {
        let service = create_service();
        let t1 = transaction(date(2024, 1, 1), &[999]);
        let id = create(&service, t1.clone()).await;

        service
            .set_purchase_date(SetPurchaseTransactionDate::new(id, date(2024, 1, 2)))
            .await
            .unwrap();

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.purchase_date(), date(2024, 1, 2));
        assert_eq!(loaded.line_items(), t1.line_items());
    }

    #[tokio::test]
    async fn list_returns_stripped_projections_in_creation_order() {
        let service = create_service();
        let t1 = create(&service, transaction(date(2024, 1, 1), &[999])).await;
        let t2 = create(&service, transaction(date(2024, 2, 1), &[100, 250])).await;

        let all = service.get_all_purchase_transactions().await.unwrap();
        let ids: Vec<_> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1, t2]);

        assert_eq!(all[0].line_item_count, 1);
        assert_eq!(all[0].total_price, price(999));
        assert_eq!(all[1].line_item_count, 2);
        assert_eq!(all[1].total_price, price(350));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let service = create_service();
        assert!(service.get_all_purchase_transactions().await.unwrap().is_empty());
        assert!(service.get_all_stores().await.unwrap().is_empty());
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn duplicate_create_keeps_first_write() {
        let service = create_service();
        let original = transaction(date(2024, 1, 1), &[999]);
        create(&service, original.clone()).await;

        let mut duplicate = original.clone();
        duplicate.set_purchase_date(date(2030, 6, 1));

        let result = service
            .create(CreatePurchaseTransaction::new(duplicate))
            .await;
        assert!(matches!(result, Err(DomainError::AlreadyExists { .. })));

        let loaded = service
            .get_detailed_purchase_transaction(original.id())
            .await
            .unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn transaction_without_line_items_is_rejected() {
        let service = create_service();
        let empty = PurchaseTransaction::create();

        let result = service
            .create(CreatePurchaseTransaction::new(empty.clone()))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::NoLineItems))
        ));
        assert!(!service.exists(empty.id()).await.unwrap());
    }

    #[tokio::test]
    async fn create_at_known_store() {
        let service = create_service();
        let store_id = service
            .create_store(CreateStore::new("Corner Shop"))
            .await
            .unwrap();

        let t1 = transaction(date(2024, 1, 1), &[999]);
        let id = service
            .create(CreatePurchaseTransaction::new(t1).at_store(store_id))
            .await
            .unwrap();

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.store_id(), Some(store_id));

        let all = service.get_all_purchase_transactions().await.unwrap();
        assert_eq!(all[0].store_name.as_deref(), Some("Corner Shop"));
    }

    #[tokio::test]
    async fn create_at_unknown_store_writes_nothing() {
        let service = create_service();
        let t1 = transaction(date(2024, 1, 1), &[999]);
        let id = t1.id();

        let result = service
            .create(CreatePurchaseTransaction::new(t1).at_store(StoreId::new()))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "Store", .. })
        ));
        assert!(!service.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn future_purchase_dates_are_accepted() {
        let service = create_service();
        let id = create(&service, transaction(date(2999, 12, 31), &[1])).await;

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.purchase_date(), date(2999, 12, 31));
    }
}

mod line_items {
    use super::*;

    #[tokio::test]
    async fn add_appends_new_line_item() {
        let service = create_service();
        let id = create(&service, transaction(date(2024, 1, 1), &[999])).await;

        let added = service
            .set_line_item(SetPurchaseTransactionLineItem::add(id, price(150)))
            .await
            .unwrap();

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.line_item_count(), 2);
        assert_eq!(loaded.line_items()[1].id(), added);
        assert_eq!(loaded.total_price(), price(1149));
    }

    #[tokio::test]
    async fn reprice_is_idempotent_and_latest_price_wins() {
        let service = create_service();
        let t1 = transaction(date(2024, 1, 1), &[999, 500]);
        let first = t1.line_items()[0].id();
        let second = t1.line_items()[1].clone();
        let id = create(&service, t1).await;

        for cents in [1000, 1000, 1234] {
            let written = service
                .set_line_item(SetPurchaseTransactionLineItem::reprice(
                    id,
                    first,
                    price(cents),
                ))
                .await
                .unwrap();
            assert_eq!(written, first);
        }

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.line_item_count(), 2);
        assert_eq!(loaded.line_items()[0].id(), first);
        assert_eq!(loaded.line_items()[0].price(), price(1234));
        assert_eq!(loaded.line_items()[1], second);
    }

    #[tokio::test]
    async fn reprice_of_unknown_line_item_fails() {
        let service = create_service();
        let id = create(&service, transaction(date(2024, 1, 1), &[999])).await;

        let result = service
            .set_line_item(SetPurchaseTransactionLineItem::reprice(
                id,
                domain::LineItemId::new(),
                price(1),
            ))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "LineItem", .. })
        ));

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.line_item_count(), 1);
    }

    #[tokio::test]
    async fn line_item_on_unknown_transaction_fails() {
        let service = create_service();

        let result = service
            .set_line_item(SetPurchaseTransactionLineItem::add(
                PurchaseTransactionId::new(),
                price(1),
            ))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "PurchaseTransaction", .. })
        ));
    }
}

mod stores {
    use super::*;

    #[tokio::test]
    async fn unknown_store_leaves_reference_unchanged() {
        let service = create_service();
        let store_id = service
            .create_store(CreateStore::new("Market"))
            .await
            .unwrap();
        let id = service
            .create(
                CreatePurchaseTransaction::new(transaction(date(2024, 1, 1), &[999]))
                    .at_store(store_id),
            )
            .await
            .unwrap();

        let result = service
            .set_store(SetPurchaseTransactionStore::new(id, StoreId::new()))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "Store", .. })
        ));

        let loaded = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(loaded.store_id(), Some(store_id));
    }

    #[tokio::test]
    async fn set_store_moves_transaction() {
        let service = create_service();
        let market = service
            .create_store(CreateStore::new("Market"))
            .await
            .unwrap();
        let bakery = service
            .create_store(CreateStore::new("Bakery"))
            .await
            .unwrap();
        let id = service
            .create(
                CreatePurchaseTransaction::new(transaction(date(2024, 1, 1), &[999]))
                    .at_store(market),
            )
            .await
            .unwrap();

        service
            .set_store(SetPurchaseTransactionStore::new(id, bakery))
            .await
            .unwrap();

        let all = service.get_all_purchase_transactions().await.unwrap();
        assert_eq!(all[0].store_id, Some(bakery));
        assert_eq!(all[0].store_name.as_deref(), Some("Bakery"));
    }

    #[tokio::test]
    async fn stores_are_listed_by_name() {
        let service = create_service();
        for name in ["Market", "Bakery", "Corner Shop"] {
            service.create_store(CreateStore::new(name)).await.unwrap();
        }

        let names: Vec<String> = service
            .get_all_stores()
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, ["Bakery", "Corner Shop", "Market"]);
    }

    #[tokio::test]
    async fn store_names_are_trimmed() {
        let service = create_service();
        let id = service
            .create_store(CreateStore::new("  Deli  "))
            .await
            .unwrap();

        let store = service.get_store(id).await.unwrap();
        assert_eq!(store.name(), "Deli");
    }
}

mod scopes {
    use super::*;

    #[tokio::test]
    async fn dropped_scope_rolls_back() {
        let service = create_service();
        let t1 = transaction(date(2024, 1, 1), &[999]);

        {
            let mut scope = service.unit_of_work().begin().await.unwrap();
            scope.add_purchase_transaction(&t1).await.unwrap();
        }

        assert!(!service.exists(t1.id()).await.unwrap());
    }

    #[tokio::test]
    async fn failed_command_leaves_no_partial_write() {
        let service = create_service();
        let id = create(&service, transaction(date(2024, 1, 1), &[999])).await;
        let before = service.get_detailed_purchase_transaction(id).await.unwrap();

        let result = service
            .set_store(SetPurchaseTransactionStore::new(id, StoreId::new()))
            .await;
        assert!(result.is_err());

        let after = service.get_detailed_purchase_transaction(id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn concurrent_creates_all_land() {
        let service = Arc::new(create_service());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    create(&service, transaction(date(2024, 1, 1), &[i * 100])).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);

        let all = service.get_all_purchase_transactions().await.unwrap();
        assert_eq!(all.len(), 20);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }
}
