//! Performance benchmarks for the aggregation pass
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use rankscope::aggregator::{group_and_aggregate, AggregationKey};
use rankscope::models::{CanonicalMetric, MetricSource};

/// Generate `queries * days` canonical records, one per (query, day).
fn generate_records(queries: usize, days: usize) -> Vec<CanonicalMetric> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut records = Vec::with_capacity(queries * days);

    for day in 0..days {
        let date = start + chrono::Duration::days(day as i64);
        for query in 0..queries {
            records.push(CanonicalMetric {
                date,
                source: MetricSource::SearchConsole,
                query: format!("query {query}"),
                url: Some(format!("https://example.com/page/{}", query % 50)),
                clicks: Some((query % 17) as u64),
                impressions: Some((query % 97 * 10) as u64),
                ctr: Some(0.05),
                position: (query % 40) as f64 + 1.0,
                volume: None,
                difficulty: None,
                cost_per_click: None,
                traffic: None,
                serp_features: None,
                previous_traffic: None,
                previous_position: None,
                previous_date: None,
            });
        }
    }
    records
}

fn benchmark_group_and_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_and_aggregate");

    for queries in [100, 1_000, 10_000] {
        let records = generate_records(queries, 28);

        group.bench_with_input(
            BenchmarkId::new("query_key_with_changes", queries),
            &records,
            |b, records| {
                b.iter(|| {
                    group_and_aggregate(black_box(records), AggregationKey::QUERY, true)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("url_key_no_changes", queries),
            &records,
            |b, records| {
                b.iter(|| group_and_aggregate(black_box(records), AggregationKey::URL, false))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_group_and_aggregate);
criterion_main!(benches);
