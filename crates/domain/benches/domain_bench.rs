use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use domain::{LineItem, LineItemBuilder, LineItemId, Price, PurchaseTransaction};

fn price(cents: i64) -> Price {
    Price::from_cents(cents).unwrap()
}

fn populated(count: i64) -> (PurchaseTransaction, Vec<LineItem>) {
    let mut transaction = PurchaseTransaction::create();
    let mut items = Vec::with_capacity(count as usize);
    for cents in 0..count {
        let item = LineItemBuilder::line_item(price(cents * 100)).build().unwrap();
        transaction.change_line_item(item.clone());
        items.push(item);
    }
    (transaction, items)
}

fn bench_build_line_item(c: &mut Criterion) {
    c.bench_function("domain/build_line_item", |b| {
        b.iter(|| LineItemBuilder::line_item(price(999)).build().unwrap());
    });
}

fn bench_append_line_items(c: &mut Criterion) {
    c.bench_function("domain/append_50_line_items", |b| {
        b.iter(|| populated(50));
    });
}

fn bench_replace_line_item(c: &mut Criterion) {
    let (transaction, items) = populated(100);
    let last = items.last().unwrap().clone();

    c.bench_function("domain/replace_last_of_100", |b| {
        b.iter_batched(
            || transaction.clone(),
            |mut transaction| {
                transaction.change_line_item(last.clone().with_price(price(1)));
                transaction
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_rehydrate(c: &mut Criterion) {
    let (transaction, items) = populated(100);

    c.bench_function("domain/rehydrate_100_line_items", |b| {
        b.iter_batched(
            || items.clone(),
            |items| {
                PurchaseTransaction::rehydrate(
                    transaction.id(),
                    transaction.purchase_date(),
                    transaction.store_id(),
                    items,
                )
                .unwrap()
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_lookup(c: &mut Criterion) {
    let (transaction, _) = populated(100);
    let missing = LineItemId::new();

    c.bench_function("domain/lookup_missing_of_100", |b| {
        b.iter(|| transaction.line_item(missing).is_none());
    });
}

criterion_group!(
    benches,
    bench_build_line_item,
    bench_append_line_items,
    bench_replace_line_item,
    bench_rehydrate,
    bench_lookup,
);
criterion_main!(benches);
