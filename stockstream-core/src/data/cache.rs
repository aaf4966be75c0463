//! Parquet price cache with Hive-style partitioning.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/{year}.parquet` plus `meta.json`.
//!
//! - Writes merge with what is already cached (newer bars win per date)
//! - `meta.json` records every fetched interval, so a hole between two
//!   cached ranges is never reported as covered
//! - Atomic writes (write to .tmp, rename into place)
//! - Integrity validation on load (schema check, row count > 0)
//! - Corrupt files are quarantined as `{filename}.quarantined`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::DataError;
use crate::domain::{DateRange, PriceBar};

const COLUMNS: [&str; 7] = ["date", "open", "high", "low", "close", "adj_close", "volume"];

/// Metadata sidecar for a cached symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub cached_at: chrono::NaiveDateTime,
    /// Disjoint fetched intervals, ascending. Sidecars written before
    /// intervals were tracked have none and are never treated as covering.
    #[serde(default)]
    pub covered: Vec<DateRange>,
}

impl CacheMeta {
    pub fn covers(&self, range: DateRange) -> bool {
        self.covered
            .iter()
            .any(|c| c.start <= range.start && range.end <= c.end)
    }
}

/// Cache status for a single symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
    /// Number of disjoint fetched intervals (more than one means gaps).
    pub intervals: usize,
}

/// How well the cache covers a requested range.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: NaiveDate,
        cached_end: NaiveDate,
    },
}

pub struct ParquetCache {
    cache_dir: PathBuf,
}

impl ParquetCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("symbol={symbol}"))
    }

    fn year_path(&self, symbol: &str, year: i32) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{year}.parquet"))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    /// Merge bars fetched for `range` into the cache.
    ///
    /// Existing bars are kept unless the new batch has a bar on the same date.
    /// The range is recorded as covered up to the last bar it returned, so a
    /// range ending in the future stays uncovered until data arrives.
    pub fn write(
        &self,
        symbol: &str,
        range: DateRange,
        bars: &[PriceBar],
    ) -> Result<(), DataError> {
        let Some(last_fetched) = bars.iter().map(|b| b.date).max() else {
            return Err(DataError::CacheError("no bars to cache".into()));
        };
        let previous = self.get_meta(symbol).map(|m| m.covered).unwrap_or_default();

        let mut merged: BTreeMap<NaiveDate, PriceBar> = match self.load(symbol) {
            Ok(existing) => existing.into_iter().map(|b| (b.date, b)).collect(),
            Err(DataError::NoCachedData { .. }) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        for bar in bars {
            merged.insert(bar.date, bar.clone());
        }
        let all: Vec<PriceBar> = merged.into_values().collect();

        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let mut by_year: BTreeMap<i32, Vec<&PriceBar>> = BTreeMap::new();
        for bar in &all {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let mut df = bars_to_dataframe(year_bars)?;
            let path = self.year_path(symbol, *year);
            let tmp_path = path.with_extension("parquet.tmp");

            write_parquet(&mut df, &tmp_path)?;

            fs::rename(&tmp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                DataError::CacheError(format!("atomic rename failed: {e}"))
            })?;
        }

        let (Some(first), Some(last)) = (all.first(), all.last()) else {
            return Err(DataError::CacheError("no bars to cache".into()));
        };
        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date: first.date,
            end_date: last.date,
            bar_count: all.len(),
            data_hash: blake3::hash(
                &serde_json::to_vec(&all)
                    .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?,
            )
            .to_hex()
            .to_string(),
            cached_at: chrono::Local::now().naive_local(),
            covered: record_interval(
                previous,
                DateRange::new(range.start, range.end.min(last_fetched)),
            ),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        debug!(symbol, bars = all.len(), "cache updated");
        Ok(())
    }

    /// Load all cached bars for a symbol, ascending by date.
    pub fn load(&self, symbol: &str) -> Result<Vec<PriceBar>, DataError> {
        let sym_dir = self.symbol_dir(symbol);
        if !sym_dir.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        let entries =
            fs::read_dir(&sym_dir).map_err(|e| DataError::CacheError(format!("read dir: {e}")))?;

        let mut all_bars = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::CacheError(format!("dir entry: {e}")))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }

            match load_and_validate_parquet(&path) {
                Ok(bars) => all_bars.extend(bars),
                Err(e) => {
                    let quarantine = path.with_extension("parquet.quarantined");
                    warn!(path = %path.display(), error = %e, "quarantining corrupt cache file");
                    let _ = fs::rename(&path, &quarantine);
                    // The recorded intervals no longer match what is on disk.
                    let _ = fs::remove_file(self.meta_path(symbol));
                }
            }
        }

        if all_bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        all_bars.sort_by_key(|b| b.date);
        Ok(all_bars)
    }

    /// Cached bars inside `range`.
    pub fn load_range(&self, symbol: &str, range: DateRange) -> Result<Vec<PriceBar>, DataError> {
        Ok(self
            .load(symbol)?
            .into_iter()
            .filter(|b| range.contains(b.date))
            .collect())
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn status<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<CacheStatus> {
        symbols
            .iter()
            .map(|sym| {
                let sym = sym.as_ref();
                let meta = self.get_meta(sym);
                CacheStatus {
                    symbol: sym.to_string(),
                    cached: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                    intervals: meta.as_ref().map_or(0, |m| m.covered.len()),
                }
            })
            .collect()
    }

    /// Symbols with a metadata sidecar, sorted.
    pub fn cached_symbols(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };
        let mut symbols: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix("symbol="))
                    .map(str::to_string)
            })
            .filter(|sym| self.meta_path(sym).exists())
            .collect();
        symbols.sort();
        symbols
    }

    pub fn covers_range(&self, symbol: &str, range: DateRange) -> CoverageResult {
        match self.get_meta(symbol) {
            None => CoverageResult::NotCached,
            Some(meta) if meta.covers(range) => CoverageResult::FullyCovered,
            Some(meta) => CoverageResult::PartiallyCovered {
                cached_start: meta.start_date,
                cached_end: meta.end_date,
            },
        }
    }
}

/// Add `new` to a set of disjoint intervals, merging overlapping and
/// adjacent ones.
fn record_interval(mut covered: Vec<DateRange>, new: DateRange) -> Vec<DateRange> {
    if !new.is_inverted() {
        covered.push(new);
    }
    covered.sort_by_key(|r| r.start);

    let mut merged: Vec<DateRange> = Vec::with_capacity(covered.len());
    for range in covered {
        match merged.last_mut() {
            Some(last) if range.start <= last.end.succ_opt().unwrap_or(last.end) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    chrono::DateTime::UNIX_EPOCH.date_naive()
}

fn bars_to_dataframe(bars: &[&PriceBar]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let column = |f: fn(&PriceBar) -> Option<f64>| -> Vec<Option<f64>> {
        bars.iter().map(|b| f(b)).collect()
    };

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("open".into(), column(|b| b.open)),
        Column::new("high".into(), column(|b| b.high)),
        Column::new("low".into(), column(|b| b.low)),
        Column::new("close".into(), column(|b| b.close)),
        Column::new("adj_close".into(), column(|b| b.adj_close)),
        Column::new("volume".into(), column(|b| b.volume)),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::CacheError("empty parquet file".into()));
    }

    for col_name in COLUMNS {
        if df.column(col_name).is_err() {
            return Err(DataError::CacheError(format!("missing column '{col_name}'")));
        }
    }

    dataframe_to_bars(&df)
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<PriceBar>, DataError> {
    let map_err = |e: PolarsError| DataError::ParquetError(format!("column read: {e}"));
    let f64_column = |name: &str| -> Result<Float64Chunked, DataError> {
        df.column(name)
            .map_err(map_err)?
            .f64()
            .cloned()
            .map_err(|e| DataError::ParquetError(format!("{name} column type: {e}")))
    };

    let date_ca = df
        .column("date")
        .map_err(map_err)?
        .date()
        .map_err(|e| DataError::ParquetError(format!("date column type: {e}")))?
        .clone();
    let open_ca = f64_column("open")?;
    let high_ca = f64_column("high")?;
    let low_ca = f64_column("low")?;
    let close_ca = f64_column("close")?;
    let adj_ca = f64_column("adj_close")?;
    let vol_ca = f64_column("volume")?;

    let epoch = epoch();
    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = date_ca
            .get(i)
            .ok_or_else(|| DataError::ParquetError(format!("null date at row {i}")))?;

        bars.push(PriceBar {
            date: epoch + chrono::Duration::days(days as i64),
            open: open_ca.get(i),
            high: high_ca.get(i),
            low: low_ca.get(i),
            close: close_ca.get(i),
            adj_close: adj_ca.get(i),
            volume: vol_ca.get(i),
        });
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn span(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end)
    }

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: Some(close - 1.0),
            high: Some(close + 1.0),
            low: Some(close - 2.0),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(1000.0),
        }
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        cache
            .write("SPY", span(d(1, 2), d(1, 3)), &[bar(d(1, 2), 101.0), bar(d(1, 3), 102.0)])
            .unwrap();
        let loaded = cache.load("SPY").unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].date, d(1, 2));
        assert_eq!(loaded[0].open, Some(100.0));
        assert_eq!(loaded[1].close, Some(102.0));
    }

    #[test]
    fn absent_values_survive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        let mut partial = bar(d(1, 2), 101.0);
        partial.volume = None;
        partial.adj_close = None;
        cache.write("SPY", span(d(1, 2), d(1, 2)), &[partial]).unwrap();

        let loaded = cache.load("SPY").unwrap();
        assert_eq!(loaded[0].volume, None);
        assert_eq!(loaded[0].adj_close, None);
        assert_eq!(loaded[0].close, Some(101.0));
    }

    #[test]
    fn writes_merge_across_years() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());

        let dec = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();
        cache.write("SPY", span(dec, dec), &[bar(dec, 99.0)]).unwrap();
        cache
            .write("SPY", span(dec, d(1, 2)), &[bar(d(1, 2), 101.0), bar(dec, 98.5)])
            .unwrap();

        let loaded = cache.load("SPY").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].close, Some(98.5));

        let meta = cache.get_meta("SPY").unwrap();
        assert_eq!(meta.start_date, dec);
        assert_eq!(meta.end_date, d(1, 2));
        assert_eq!(meta.bar_count, 2);
    }

    #[test]
    fn load_nonexistent_is_no_cached_data() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        assert!(matches!(
            cache.load("NONEXISTENT"),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn corrupt_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache.write("SPY", span(d(1, 2), d(1, 2)), &[bar(d(1, 2), 101.0)]).unwrap();

        let path = cache.year_path("SPY", 2024);
        fs::write(&path, b"not parquet").unwrap();

        assert!(cache.load("SPY").is_err());
        assert!(path.with_extension("parquet.quarantined").exists());
        assert!(cache.get_meta("SPY").is_none());
        assert_eq!(
            cache.covers_range("SPY", span(d(1, 2), d(1, 2))),
            CoverageResult::NotCached
        );
    }

    #[test]
    fn status_and_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache
            .write("SPY", span(d(1, 2), d(1, 5)), &[bar(d(1, 2), 101.0), bar(d(1, 5), 102.0)])
            .unwrap();

        let statuses = cache.status(&["SPY", "QQQ"]);
        assert!(statuses[0].cached);
        assert_eq!(statuses[0].bar_count, Some(2));
        assert!(!statuses[1].cached);

        assert_eq!(
            cache.covers_range("SPY", DateRange::new(d(1, 2), d(1, 5))),
            CoverageResult::FullyCovered
        );
        assert!(matches!(
            cache.covers_range("SPY", DateRange::new(d(1, 1), d(1, 5))),
            CoverageResult::PartiallyCovered { .. }
        ));
        assert_eq!(
            cache.covers_range("QQQ", DateRange::new(d(1, 2), d(1, 5))),
            CoverageResult::NotCached
        );
        assert_eq!(cache.cached_symbols(), vec!["SPY".to_string()]);
    }

    #[test]
    fn load_range_filters() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache
            .write(
                "SPY",
                span(d(1, 2), d(1, 4)),
                &[bar(d(1, 2), 1.0), bar(d(1, 3), 2.0), bar(d(1, 4), 3.0)],
            )
            .unwrap();
        let bars = cache.load_range("SPY", DateRange::new(d(1, 3), d(1, 4))).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn hole_between_cached_ranges_is_not_covered() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache
            .write("SPY", span(d(1, 1), d(1, 5)), &[bar(d(1, 2), 1.0), bar(d(1, 5), 2.0)])
            .unwrap();
        cache
            .write("SPY", span(d(3, 20), d(3, 25)), &[bar(d(3, 20), 3.0), bar(d(3, 25), 4.0)])
            .unwrap();

        assert!(matches!(
            cache.covers_range("SPY", span(d(2, 1), d(2, 10))),
            CoverageResult::PartiallyCovered { .. }
        ));
        assert!(matches!(
            cache.covers_range("SPY", span(d(1, 3), d(3, 21))),
            CoverageResult::PartiallyCovered { .. }
        ));
        assert_eq!(
            cache.covers_range("SPY", span(d(3, 21), d(3, 24))),
            CoverageResult::FullyCovered
        );
        assert_eq!(cache.status(&["SPY"])[0].intervals, 2);
    }

    #[test]
    fn coverage_ends_at_last_fetched_bar() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache
            .write("SPY", span(d(1, 2), d(1, 10)), &[bar(d(1, 2), 1.0), bar(d(1, 5), 2.0)])
            .unwrap();

        let meta = cache.get_meta("SPY").unwrap();
        assert_eq!(meta.covered, vec![span(d(1, 2), d(1, 5))]);
        assert!(matches!(
            cache.covers_range("SPY", span(d(1, 2), d(1, 10))),
            CoverageResult::PartiallyCovered { .. }
        ));
    }

    #[test]
    fn adjacent_and_overlapping_intervals_merge() {
        let merged = record_interval(
            vec![span(d(1, 1), d(1, 5)), span(d(1, 20), d(1, 31))],
            span(d(1, 6), d(1, 21)),
        );
        assert_eq!(merged, vec![span(d(1, 1), d(1, 31))]);

        let untouched = record_interval(vec![span(d(1, 1), d(1, 5))], span(d(1, 9), d(1, 8)));
        assert_eq!(untouched, vec![span(d(1, 1), d(1, 5))]);
    }

    #[test]
    fn sidecar_without_intervals_is_never_covering() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        cache
            .write("SPY", span(d(1, 2), d(1, 3)), &[bar(d(1, 2), 1.0), bar(d(1, 3), 2.0)])
            .unwrap();

        let mut meta = serde_json::to_value(cache.get_meta("SPY").unwrap()).unwrap();
        meta.as_object_mut().unwrap().remove("covered");
        fs::write(cache.meta_path("SPY"), meta.to_string()).unwrap();

        assert!(cache.get_meta("SPY").unwrap().covered.is_empty());
        assert!(matches!(
            cache.covers_range("SPY", span(d(1, 2), d(1, 3))),
            CoverageResult::PartiallyCovered { .. }
        ));
    }
}
