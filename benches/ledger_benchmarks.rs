use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use stockflow_api::{
    entities::order_line,
    services::{orders::required_per_product, products::weighted_average_cost},
};
use uuid::Uuid;

// Benchmark for the weighted average cost recomputation on receipt
fn weighted_average_benchmark(c: &mut Criterion) {
    c.bench_function("weighted_average_cost", |b| {
        b.iter(|| {
            weighted_average_cost(
                black_box(1_250),
                black_box(Decimal::new(13_333, 2)),
                black_box(75),
                black_box(Decimal::new(19_999, 2)),
            )
        });
    });
}

// Benchmark for per-product aggregation of order lines before delivery
fn line_aggregation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("required_per_product");
    let products: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();

    for size in [1usize, 10, 50, 200].iter() {
        let lines: Vec<order_line::Model> = (0..*size)
            .map(|i| order_line::Model {
                id: Uuid::new_v4(),
                order_id: Uuid::nil(),
                product_id: products[i % products.len()],
                quantity: (i as i32 % 17) + 1,
                unit_price: Decimal::ONE,
                created_at: Utc::now(),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| required_per_product(black_box(lines)));
        });
    }

    group.finish();
}

criterion_group!(benches, weighted_average_benchmark, line_aggregation_benchmark);
criterion_main!(benches);
