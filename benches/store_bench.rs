//! Benchmarks for the Nexus state core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nexus::slice::{partition, toggle};
use nexus::{CryptoRecord, NotificationEntry, NotificationFeed};
use std::collections::BTreeSet;

fn create_test_coins(count: usize) -> Vec<CryptoRecord> {
    (0..count)
        .map(|i| {
            CryptoRecord::new(format!("coin-{}", i), format!("Coin {}", i), "CN")
                .price(i as f64)
                .change_24h((i % 20) as f64 - 10.0)
        })
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for size in [10, 100, 1000] {
        let coins = create_test_coins(size);
        let favorites: BTreeSet<String> = coins
            .iter()
            .step_by(3)
            .map(|c| c.id.clone())
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("partition_{}", size), |b| {
            b.iter(|| partition(black_box(&coins), black_box(&favorites)))
        });
    }

    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    c.bench_function("toggle_favorite", |b| {
        let mut favorites: BTreeSet<String> =
            (0..100).map(|i| format!("coin-{}", i)).collect();
        b.iter(|| toggle(&mut favorites, black_box("coin-50")))
    });
}

fn bench_feed(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("feed");

    group.bench_function("append_at_capacity", |b| {
        let feed = NotificationFeed::new(50);
        b.to_async(&rt).iter(|| async {
            feed.append(NotificationEntry::price_alert("Bitcoin up 6.00%", "BTC"))
                .await
        })
    });

    group.bench_function("all_50", |b| {
        let feed = NotificationFeed::new(50);
        rt.block_on(async {
            for i in 0..50 {
                feed.append(NotificationEntry::price_alert(format!("alert {}", i), ""))
                    .await;
            }
        });
        b.to_async(&rt).iter(|| async { black_box(feed.all().await) })
    });

    group.finish();
}

criterion_group!(benches, bench_partition, bench_toggle, bench_feed);
criterion_main!(benches);
