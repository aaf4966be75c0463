//! Per-symbol price series, multi-symbol tables and return series.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::{PriceBar, PriceField};

/// Inclusive calendar date range for a data request.
///
/// An inverted range (`start > end`) is representable on purpose: the user
/// can pick it in the sidebar and every layer must treat it as "no rows".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered (0 for an inverted range).
    pub fn days(&self) -> i64 {
        if self.is_inverted() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }
}

/// Bars for one symbol, dates strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting by date. A repeated date keeps the later bar.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Keep only bars inside `range`.
    pub fn restrict(&self, range: DateRange) -> PriceSeries {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| range.contains(b.date))
                .cloned()
                .collect(),
        }
    }

    /// `(date, value)` pairs for a column, skipping absent values.
    pub fn points(&self, field: PriceField) -> Vec<(NaiveDate, f64)> {
        self.bars
            .iter()
            .filter_map(|b| b.get(field).map(|v| (b.date, v)))
            .collect()
    }

    /// Chart widget feed for a column.
    pub fn time_values(&self, field: PriceField) -> Vec<TimeValue> {
        self.points(field)
            .into_iter()
            .map(|(time, value)| TimeValue { time, value })
            .collect()
    }
}

/// Several symbols fetched for the same range, kept in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    series: Vec<PriceSeries>,
}

impl PriceTable {
    pub fn new(series: Vec<PriceSeries>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &[PriceSeries] {
        &self.series
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol.as_str()).collect()
    }

    /// True if no symbol returned any rows.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(PriceSeries::is_empty)
    }

    /// Union of all dates across symbols, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let set: BTreeSet<NaiveDate> = self
            .series
            .iter()
            .flat_map(|s| s.bars().iter().map(|b| b.date))
            .collect();
        set.into_iter().collect()
    }

    /// Number of rows in the date-indexed view.
    pub fn row_count(&self) -> usize {
        self.dates().len()
    }

    /// One column for one symbol aligned to [`PriceTable::dates`].
    ///
    /// Dates on which the symbol has no bar yield `None`.
    pub fn column(&self, symbol: &str, field: PriceField) -> Vec<Option<f64>> {
        let dates = self.dates();
        let Some(series) = self.get(symbol) else {
            return vec![None; dates.len()];
        };

        let mut bars = series.bars().iter().peekable();
        dates
            .iter()
            .map(|date| match bars.peek() {
                Some(bar) if bar.date == *date => bars.next().and_then(|b| b.get(field)),
                _ => None,
            })
            .collect()
    }
}

/// Cumulative relative return per date for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl ReturnSeries {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    /// Return on the last date, i.e. the total over the range.
    pub fn total(&self) -> Option<f64> {
        self.points.last().map(|(_, v)| *v)
    }

    pub fn time_values(&self) -> Vec<TimeValue> {
        self.points
            .iter()
            .map(|&(time, value)| TimeValue { time, value })
            .collect()
    }
}

/// One point of the line-chart widget feed: `{"time": "YYYY-MM-DD", "value": f64}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    pub time: NaiveDate,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    fn bar(day: u32, adj: f64) -> PriceBar {
        PriceBar {
            adj_close: Some(adj),
            close: Some(adj),
            ..PriceBar::empty(d(day))
        }
    }

    #[test]
    fn series_sorts_and_dedups() {
        let s = PriceSeries::new("AAPL", vec![bar(5, 3.0), bar(3, 1.0), bar(5, 4.0), bar(4, 2.0)]);
        let dates: Vec<_> = s.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![d(3), d(4), d(5)]);
        assert_eq!(s.bars()[2].adj_close, Some(4.0));
    }

    #[test]
    fn restrict_filters_inclusive() {
        let s = PriceSeries::new("AAPL", vec![bar(3, 1.0), bar(4, 2.0), bar(5, 3.0)]);
        let r = s.restrict(DateRange::new(d(4), d(5)));
        assert_eq!(r.len(), 2);
        assert_eq!(r.first_date(), Some(d(4)));
    }

    #[test]
    fn inverted_range_has_no_days() {
        let range = DateRange::new(d(5), d(3));
        assert!(range.is_inverted());
        assert_eq!(range.days(), 0);
        assert!(!range.contains(d(4)));
    }

    #[test]
    fn table_column_aligns_to_union_dates() {
        let table = PriceTable::new(vec![
            PriceSeries::new("AAA", vec![bar(3, 1.0), bar(5, 3.0)]),
            PriceSeries::new("BBB", vec![bar(4, 20.0), bar(5, 30.0)]),
        ]);
        assert_eq!(table.dates(), vec![d(3), d(4), d(5)]);
        assert_eq!(
            table.column("AAA", PriceField::AdjClose),
            vec![Some(1.0), None, Some(3.0)]
        );
        assert_eq!(
            table.column("BBB", PriceField::AdjClose),
            vec![None, Some(20.0), Some(30.0)]
        );
        assert_eq!(table.column("ZZZ", PriceField::AdjClose), vec![None, None, None]);
    }

    #[test]
    fn empty_table_reports_empty() {
        let table = PriceTable::new(vec![PriceSeries::empty("AAA")]);
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn time_values_serialize_as_widget_feed() {
        let s = PriceSeries::new("AAPL", vec![bar(3, 1.5)]);
        let json = serde_json::to_string(&s.time_values(PriceField::Close)).unwrap();
        assert_eq!(json, r#"[{"time":"2023-01-03","value":1.5}]"#);
    }
}
