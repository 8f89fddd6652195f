//! Performance benchmarks for grid-signals
//!
//! Run with: `cargo bench`
//! View results: `open target/criterion/report/index.html`

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grid_signals::{build_grid, scan_crossings, GridAnalysis, PricePoint, PriceSeries};

/// Roughly one trading year of closes per 250 points
fn generate_series(count: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let t = i as f64;
            PricePoint {
                datetime: start + Duration::days(i as i64),
                price: 500.0 + 40.0 * (t * 0.13).sin() + 15.0 * (t * 0.71).cos(),
            }
        })
        .collect()
}

fn benchmark_build_grid(c: &mut Criterion) {
    let series = generate_series(250);
    c.bench_function("build_grid_250x10", |b| {
        b.iter(|| build_grid(black_box(&series), black_box(10)))
    });
}

fn benchmark_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_crossings");
    for &len in &[125usize, 250, 2_500] {
        let series = generate_series(len);
        for &grid_count in &[3usize, 10, 20] {
            let grid = build_grid(&series, grid_count);
            group.bench_with_input(
                BenchmarkId::new(format!("n{}", len), grid_count),
                &grid,
                |b, grid| b.iter(|| scan_crossings(black_box(&series), black_box(grid))),
            );
        }
    }
    group.finish();
}

fn benchmark_analysis(c: &mut Criterion) {
    let series = generate_series(250);
    c.bench_function("grid_analysis_250x10", |b| {
        b.iter(|| GridAnalysis::run(black_box(&series), 10).signals())
    });
}

criterion_group!(benches, benchmark_build_grid, benchmark_scan, benchmark_analysis);
criterion_main!(benches);
