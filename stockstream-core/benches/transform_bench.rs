//! Criterion benchmarks for the return transform and the forecaster.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use stockstream_core::domain::{PriceBar, PriceSeries, PriceTable};
use stockstream_core::{cumulative_return, relative_returns, AdditiveForecaster, Forecaster};

fn make_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.05)
        .collect()
}

fn make_history(n: usize) -> Vec<(NaiveDate, f64)> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    start.iter_days().zip(make_prices(n)).collect()
}

fn bench_cumulative_return(c: &mut Criterion) {
    let mut group = c.benchmark_group("cumulative_return");
    for n in [252, 2520, 25_200] {
        let prices = make_prices(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &prices, |b, p| {
            b.iter(|| cumulative_return(black_box(p)))
        });
    }
    group.finish();
}

fn bench_relative_returns(c: &mut Criterion) {
    let table = PriceTable::new(
        ["AAPL", "MSFT", "GOOGL", "AMZN"]
            .iter()
            .enumerate()
            .map(|(k, symbol)| {
                let bars = make_history(2520)
                    .into_iter()
                    .enumerate()
                    // Stagger gaps so the union axis needs forward fill.
                    .filter(|(i, _)| i % (k + 3) != 0)
                    .map(|(_, (date, price))| {
                        let mut bar = PriceBar::empty(date);
                        bar.adj_close = Some(price);
                        bar
                    })
                    .collect();
                PriceSeries::new(*symbol, bars)
            })
            .collect(),
    );
    c.bench_function("relative_returns_4x2520", |b| {
        b.iter(|| relative_returns(black_box(&table)))
    });
}

fn bench_forecast(c: &mut Criterion) {
    let forecaster = AdditiveForecaster::default();
    let mut group = c.benchmark_group("additive_forecast");
    group.sample_size(20);
    for n in [250, 1000] {
        let history = make_history(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &history, |b, h| {
            b.iter(|| forecaster.forecast(black_box(h), 365))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_cumulative_return,
    bench_relative_returns,
    bench_forecast
);
criterion_main!(benches);
