//! Validation and scoring throughput.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use receipt_processor::model::{Item, Receipt};
use receipt_processor::{points, validate};

fn receipt_with_items(count: usize) -> Receipt {
    Receipt {
        retailer: "M&M Corner Market".to_string(),
        purchase_date: "2022-03-21".to_string(),
        purchase_time: "14:33".to_string(),
        items: (0..count)
            .map(|i| Item {
                short_description: format!("Item number {i}"),
                price: format!("{}.{:02}", i % 50, i % 100),
            })
            .collect(),
        total: "125.75".to_string(),
    }
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    for count in [1usize, 10, 100] {
        let receipt = receipt_with_items(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &receipt, |b, receipt| {
            b.iter(|| validate(black_box(receipt)))
        });
    }
    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    for count in [1usize, 10, 100] {
        let validated = match validate(&receipt_with_items(count)) {
            Ok(validated) => validated,
            Err(err) => panic!("benchmark fixture rejected: {err}"),
        };
        group.bench_with_input(BenchmarkId::from_parameter(count), &validated, |b, receipt| {
            b.iter(|| points::score(black_box(receipt)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_validate, bench_score);
criterion_main!(benches);
