//! Cumulative relative returns.
//!
//! `result[i] = Π(1 + p[j]/p[j-1] - 1) - 1` for `j` in `1..=i`, with the
//! first value pinned to `0.0` because it has no prior reference point.

use thiserror::Error;

use crate::domain::{PriceField, PriceTable, ReturnSeries};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnsError {
    #[error("cannot compute returns over an empty price sequence")]
    EmptyInput,
}

/// Compounded simple returns relative to the first price.
///
/// Zero or negative prices are not special-cased; a zero price produces an
/// infinite or NaN return exactly as the arithmetic dictates.
pub fn cumulative_return(prices: &[f64]) -> Result<Vec<f64>, ReturnsError> {
    if prices.is_empty() {
        return Err(ReturnsError::EmptyInput);
    }

    let mut out = Vec::with_capacity(prices.len());
    out.push(0.0);

    let mut growth = 1.0;
    for pair in prices.windows(2) {
        let period_return = pair[1] / pair[0] - 1.0;
        growth *= 1.0 + period_return;
        out.push(growth - 1.0);
    }

    Ok(out)
}

/// Relative returns of every symbol's adjusted close, on the table's union
/// date axis.
///
/// Gaps are forward-filled from the last known price. Dates before a
/// symbol's first known price get `0.0`. A symbol without rows yields an
/// empty series.
pub fn relative_returns(table: &PriceTable) -> Vec<ReturnSeries> {
    let dates = table.dates();

    table
        .series()
        .iter()
        .map(|series| {
            if series.is_empty() {
                return ReturnSeries::empty(series.symbol.clone());
            }
            let column = table.column(&series.symbol, PriceField::AdjClose);
            let values = returns_over_gaps(&column);
            ReturnSeries {
                symbol: series.symbol.clone(),
                points: dates.iter().copied().zip(values).collect(),
            }
        })
        .collect()
}

fn returns_over_gaps(column: &[Option<f64>]) -> Vec<f64> {
    let Some(first_known) = column.iter().position(Option::is_some) else {
        return vec![0.0; column.len()];
    };

    let mut filled = Vec::with_capacity(column.len() - first_known);
    let mut last = 0.0;
    for value in &column[first_known..] {
        if let Some(price) = value {
            last = *price;
        }
        filled.push(last);
    }

    let mut out = vec![0.0; first_known];
    if let Ok(returns) = cumulative_return(&filled) {
        out.extend(returns);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceBar, PriceSeries};
    use chrono::NaiveDate;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn first_value_is_zero() {
        assert_eq!(cumulative_return(&[42.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn compounds_against_first_price() {
        let r = cumulative_return(&[100.0, 110.0, 99.0]).unwrap();
        assert_close(&r, &[0.0, 0.10, -0.01]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(cumulative_return(&[]), Err(ReturnsError::EmptyInput));
    }

    #[test]
    fn zero_price_is_not_special_cased() {
        let r = cumulative_return(&[10.0, 0.0, 5.0]).unwrap();
        assert_eq!(r[1], -1.0);
        assert!(!r[2].is_finite());
    }

    fn bar(day: u32, adj: Option<f64>) -> PriceBar {
        PriceBar {
            adj_close: adj,
            ..PriceBar::empty(NaiveDate::from_ymd_opt(2023, 1, day).unwrap())
        }
    }

    #[test]
    fn gaps_are_forward_filled() {
        let table = PriceTable::new(vec![PriceSeries::new(
            "AAA",
            vec![bar(3, Some(100.0)), bar(4, None), bar(5, Some(120.0))],
        )]);
        let returns = relative_returns(&table);
        assert_close(&returns[0].values(), &[0.0, 0.0, 0.2]);
    }

    #[test]
    fn leading_gaps_on_union_axis_are_zero() {
        let table = PriceTable::new(vec![
            PriceSeries::new("AAA", vec![bar(3, Some(10.0)), bar(4, Some(11.0)), bar(5, Some(12.0))]),
            PriceSeries::new("BBB", vec![bar(4, Some(50.0)), bar(5, Some(55.0))]),
        ]);
        let returns = relative_returns(&table);
        assert_eq!(returns.len(), 2);
        assert_close(&returns[1].values(), &[0.0, 0.0, 0.1]);
        assert_eq!(returns[1].points.len(), 3);
    }

    #[test]
    fn symbol_without_rows_yields_empty_series() {
        let table = PriceTable::new(vec![
            PriceSeries::new("AAA", vec![bar(3, Some(10.0))]),
            PriceSeries::empty("BBB"),
        ]);
        let returns = relative_returns(&table);
        assert!(returns[1].points.is_empty());
        assert_eq!(returns[0].values(), vec![0.0]);
    }

    #[test]
    fn all_absent_column_yields_zeros() {
        let table = PriceTable::new(vec![PriceSeries::new("AAA", vec![bar(3, None), bar(4, None)])]);
        assert_eq!(relative_returns(&table)[0].values(), vec![0.0, 0.0]);
    }
}
