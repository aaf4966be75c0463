//! PriceBar: one trading day of OHLCV data for a symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar as delivered by a market data provider.
///
/// Any numeric field may be absent: providers leave holes for halted
/// sessions, partial records and symbols that did not trade on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    /// A bar with only a date; every value absent.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            adj_close: None,
            volume: None,
        }
    }

    /// True if every value on the bar is absent.
    pub fn is_void(&self) -> bool {
        PriceField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Value of one column.
    pub fn get(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close,
            PriceField::Volume => self.volume,
        }
    }

    /// Open/high/low/close when all four are present.
    pub fn ohlc(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.open?, self.high?, self.low?, self.close?))
    }
}

/// A column of the price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 6] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
        PriceField::Volume,
    ];

    /// Column header used by tables and CSV exports.
    pub fn label(self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
            PriceField::Volume => "Volume",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            open: Some(100.0),
            high: Some(105.0),
            low: Some(98.0),
            close: Some(103.0),
            adj_close: Some(102.5),
            volume: Some(50_000.0),
        }
    }

    #[test]
    fn partial_bar_has_no_ohlc() {
        let mut bar = sample_bar();
        bar.low = None;
        assert!(bar.ohlc().is_none());
        assert!(!bar.is_void());
    }

    #[test]
    fn empty_bar_is_void() {
        let bar = PriceBar::empty(NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert!(bar.is_void());
    }

    #[test]
    fn field_accessor_matches_struct() {
        let bar = sample_bar();
        assert_eq!(bar.get(PriceField::AdjClose), Some(102.5));
        assert_eq!(bar.get(PriceField::Volume), Some(50_000.0));
        assert_eq!(PriceField::AdjClose.label(), "Adj Close");
    }
}
