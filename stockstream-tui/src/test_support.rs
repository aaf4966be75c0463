//! Shared fixtures for the TUI unit tests.

use std::collections::HashMap;

use chrono::NaiveDate;
use ratatui::buffer::Buffer;

use stockstream_core::data::{DataError, DataSource, FetchResult, MarketDataProvider};
use stockstream_core::{
    AdditiveForecaster, Dashboard, DateRange, PriceBar, PriceSeries, TickerDirectory,
};

use crate::app::AppState;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// In-memory provider serving synthetic daily bars.
pub struct FixtureProvider {
    bars: HashMap<String, Vec<PriceBar>>,
}

impl MarketDataProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.into(),
            })?;
        Ok(FetchResult {
            series: PriceSeries::new(symbol, bars.clone()).restrict(range),
            source: DataSource::Fixture,
        })
    }
}

pub fn bars_from(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    start
        .iter_days()
        .zip(closes)
        .map(|(date, &close)| PriceBar {
            date,
            open: Some(close - 0.5),
            high: Some(close + 1.0),
            low: Some(close - 1.0),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(1_000_000.0),
        })
        .collect()
}

pub fn test_dashboard() -> Dashboard<FixtureProvider, AdditiveForecaster> {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64 * 0.1).collect();
    let mut bars = HashMap::new();
    bars.insert("AAPL".to_string(), bars_from(d(2022, 1, 1), &closes));
    bars.insert("MSFT".to_string(), bars_from(d(2022, 1, 1), &closes[..200]));
    let directory = TickerDirectory::from_pairs([
        ("Apple Inc", "AAPL"),
        ("Microsoft Corporation", "MSFT"),
        ("Ghost Holdings", "GHST"),
    ]);
    Dashboard::new(directory, FixtureProvider { bars }, AdditiveForecaster::default())
}

pub fn test_app() -> AppState {
    AppState::new(
        vec![
            "Apple Inc".into(),
            "Microsoft Corporation".into(),
            "Ghost Holdings".into(),
        ],
        d(2022, 1, 1),
        d(2023, 3, 31),
    )
}

/// Flatten a buffer into one string for content assertions.
pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell((x, y)) {
                content.push_str(cell.symbol());
            }
        }
        content.push('\n');
    }
    content
}
