use chrono::{Duration, Utc};
use common::{CustomerId, Money, ProductCategory, ProductId, Quantity};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Cart, Checkout, effective_price};
use order_store::{InMemoryOrderStore, NewProduct, OrderStore, Product};

fn product(id: i64, stock_units: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        category: ProductCategory::Vegetable,
        base_price: Money::from_cents(1_250),
        stock: Quantity::from_units(stock_units),
        restock_threshold: Quantity::from_units(5),
    }
}

fn bench_effective_price(c: &mut Criterion) {
    let tomato = product(1, 40);

    c.bench_function("pricing/effective_price", |b| {
        b.iter(|| {
            for milli in (0..50_000).step_by(500) {
                std::hint::black_box(effective_price(&tomato, Quantity::from_milli(milli)));
            }
        });
    });
}

fn bench_cart_totals(c: &mut Criterion) {
    let mut cart = Cart::new(CustomerId::new(1));
    for id in 1..=50 {
        cart.add_line(product(id, 100), Quantity::from_milli(1_750))
            .unwrap();
    }
    cart.compute_loyalty_discount(7);

    c.bench_function("cart/totals_50_lines", |b| {
        b.iter(|| std::hint::black_box(cart.totals()));
    });
}

fn bench_checkout_commit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let stocked = rt.block_on(async {
        store
            .insert_product(NewProduct {
                name: "Potato".to_string(),
                category: ProductCategory::Vegetable,
                base_price: Money::from_units(3),
                stock: Quantity::from_units(1_000_000_000),
                restock_threshold: Quantity::from_units(10),
            })
            .await
            .unwrap()
    });
    let checkout = Checkout::new(store);
    let customer = CustomerId::new(1);
    let mut cart = Cart::new(customer);
    cart.add_line(stocked, Quantity::from_units(2)).unwrap();

    c.bench_function("checkout/commit_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let snapshot = cart
                    .to_order_snapshot(Some(Utc::now() + Duration::hours(2)))
                    .unwrap();
                checkout.commit(snapshot, customer).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_effective_price,
    bench_cart_totals,
    bench_checkout_commit
);
criterion_main!(benches);
