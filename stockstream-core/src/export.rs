//! CSV and JSON export of panel data.
//!
//! - **CSV**: price tables, cumulative returns and forecasts for spreadsheets
//! - **JSON**: the `[{"time", "value"}]` feed consumed by line-chart widgets

use std::path::Path;

use thiserror::Error;

use crate::domain::{PriceField, PriceSeries, PriceTable, ReturnSeries, TimeValue};
use crate::forecast::Forecast;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("export output is not valid UTF-8")]
    Utf8,
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|_| ExportError::Utf8)
}

/// One row per date on the union axis; columns `{Field} {SYMBOL}`.
pub fn price_table_csv(table: &PriceTable) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Date".to_string()];
    for field in PriceField::ALL {
        for symbol in table.symbols() {
            header.push(format!("{} {symbol}", field.label()));
        }
    }
    wtr.write_record(&header)?;

    let columns: Vec<Vec<Option<f64>>> = PriceField::ALL
        .iter()
        .flat_map(|&field| {
            table
                .symbols()
                .into_iter()
                .map(move |symbol| table.column(symbol, field))
        })
        .collect();

    for (i, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(columns.iter().map(|c| cell(c[i])));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Columns: Date, Open, High, Low, Close, Adj Close, Volume.
pub fn series_csv(series: &PriceSeries) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["Date"];
    header.extend(PriceField::ALL.iter().map(|f| f.label()));
    wtr.write_record(&header)?;

    for bar in series.bars() {
        let mut record = vec![bar.date.to_string()];
        record.extend(PriceField::ALL.iter().map(|&f| cell(bar.get(f))));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Long format: date, symbol, cumulative_return.
pub fn returns_csv(returns: &[ReturnSeries]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "symbol", "cumulative_return"])?;
    for series in returns {
        for (date, value) in &series.points {
            wtr.write_record([
                date.to_string(),
                series.symbol.clone(),
                format!("{value:.6}"),
            ])?;
        }
    }
    finish(wtr)
}

pub fn forecast_csv(forecast: &Forecast) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ds",
        "yhat",
        "yhat_lower",
        "yhat_upper",
        "trend",
        "weekly",
        "yearly",
    ])?;
    for row in forecast.rows() {
        wtr.write_record([
            row.date.to_string(),
            format!("{:.6}", row.yhat),
            format!("{:.6}", row.yhat_lower),
            format!("{:.6}", row.yhat_upper),
            format!("{:.6}", row.trend),
            format!("{:.6}", row.weekly),
            format!("{:.6}", row.yearly),
        ])?;
    }
    finish(wtr)
}

pub fn time_values_json(points: &[TimeValue]) -> Result<String, ExportError> {
    Ok(serde_json::to_string(points)?)
}

pub fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}
