//! StockStream CLI: scripting access to the dashboard panels and the cache.
//!
//! Commands:
//! - `tickers`: list the company/symbol reference table
//! - `compare`: cumulative returns for several companies
//! - `quote`: raw daily bars for one company
//! - `predict`: additive forecast of one company's close
//! - `download`: fetch market data from Yahoo Finance and cache as Parquet
//! - `cache status`: report cached symbols, date ranges and sizes

mod table;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockstream_core::dashboard::{
    ChartStyle, ForecastOutcome, HorizonYears, PanelRequest, PanelView, PriceChartStyle,
};
use stockstream_core::data::{
    build_provider, download_symbols, CircuitBreaker, MarketDataProvider, ParquetCache,
    StdoutProgress, YahooProvider,
};
use stockstream_core::export;
use stockstream_core::{
    AdditiveForecaster, AppConfig, Dashboard, DateRange, PriceField, PriceSeries, Session,
    TickerDirectory, TimeValue,
};

#[derive(Parser)]
#[command(name = "stockstream", about = "StockStream CLI: stock comparison and prediction")]
struct Cli {
    /// Configuration file (defaults to $STOCKSTREAM_CONFIG, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RangeArgs {
    /// Start date (YYYY-MM-DD). Defaults to `default_start` from the config.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the companies in the ticker directory.
    Tickers,
    /// Cumulative returns of several companies over a date range.
    Compare {
        /// Company names as listed by `tickers`.
        #[arg(required = true)]
        companies: Vec<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Write the returns as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the raw price table (every field per symbol) as CSV to this path.
        #[arg(long)]
        prices_csv: Option<PathBuf>,

        /// Print the returns as a JSON chart feed instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Daily bars for one company.
    Quote {
        company: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Write the bars as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the closing prices as a JSON chart feed instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Forecast one company's closing price.
    Predict {
        company: String,

        /// Years of prediction (1-4).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
        years: u8,

        #[command(flatten)]
        range: RangeArgs,

        /// Write the full forecast as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the predicted values as a JSON chart feed instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Download market data from Yahoo Finance and cache as Parquet.
    Download {
        /// Symbols to download. Defaults to every symbol in the ticker directory.
        symbols: Vec<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges and sizes.
    Status {
        /// Symbols to report. Defaults to everything in the cache.
        symbols: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STOCKSTREAM_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), dirs::config_dir().as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Tickers => run_tickers(&config),
        Commands::Compare {
            companies,
            range,
            csv,
            prices_csv,
            json,
        } => run_compare(
            &config,
            companies,
            &range,
            csv.as_deref(),
            prices_csv.as_deref(),
            json,
        ),
        Commands::Quote {
            company,
            range,
            csv,
            json,
        } => run_quote(&config, company, &range, csv.as_deref(), json),
        Commands::Predict {
            company,
            years,
            range,
            csv,
            json,
        } => run_predict(&config, company, years, &range, csv.as_deref(), json),
        Commands::Download {
            symbols,
            range,
            force,
        } => run_download(&config, symbols, &range, force),
        Commands::Cache { action } => match action {
            CacheAction::Status { symbols } => run_cache_status(&config, &symbols),
        },
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn date_range(config: &AppConfig, args: &RangeArgs) -> Result<DateRange> {
    let start = args
        .start
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or(config.default_start);
    let end = args
        .end
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    Ok(DateRange::new(start, end))
}

fn load_directory(config: &AppConfig) -> Result<TickerDirectory> {
    TickerDirectory::from_path(&config.tickers_file).with_context(|| {
        format!(
            "failed to load ticker directory from {}",
            config.tickers_file.display()
        )
    })
}

fn build_dashboard(
    config: &AppConfig,
) -> Result<Dashboard<Box<dyn MarketDataProvider>, AdditiveForecaster>> {
    let directory = load_directory(config)?;
    let provider = build_provider(config).context("failed to build market data provider")?;
    Ok(Dashboard::new(directory, provider, AdditiveForecaster::default()))
}

/// Evaluate one panel request; a prompt view means the request cannot be served.
fn evaluate<P, F>(dashboard: &Dashboard<P, F>, request: &PanelRequest) -> Result<PanelView>
where
    P: MarketDataProvider,
    F: stockstream_core::Forecaster,
{
    let mut session = Session::new();
    let view = dashboard.evaluate(request, &mut session)?;
    if let Some(message) = view.prompt_message() {
        bail!("{message}");
    }
    Ok(view)
}

fn run_tickers(config: &AppConfig) -> Result<()> {
    let directory = load_directory(config)?;
    let rows: Vec<Vec<String>> = directory
        .entries()
        .iter()
        .map(|e| vec![e.company.clone(), e.symbol.clone()])
        .collect();
    print!("{}", table::render(&["Company Name", "Symbol"], &rows));
    Ok(())
}

fn run_compare(
    config: &AppConfig,
    companies: Vec<String>,
    range: &RangeArgs,
    csv: Option<&Path>,
    prices_csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    let request = PanelRequest::Comparison {
        companies,
        range: date_range(config, range)?,
        style: ChartStyle::Line,
    };
    let PanelView::Comparison(view) = evaluate(&dashboard, &request)? else {
        bail!("unexpected view for comparison request");
    };

    if let Some(path) = csv {
        export::write_file(path, &export::returns_csv(&view.returns)?)?;
        info!(path = %path.display(), "returns written");
    }
    if let Some(path) = prices_csv {
        export::write_file(path, &export::price_table_csv(&view.prices)?)?;
        info!(path = %path.display(), "price table written");
    }

    if json {
        let feeds: BTreeMap<&str, Vec<TimeValue>> = view
            .returns
            .iter()
            .map(|r| (r.symbol.as_str(), r.time_values()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&feeds)?);
        return Ok(());
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, series) in view.returns.iter().enumerate() {
        for &(date, value) in &series.points {
            by_date
                .entry(date)
                .or_insert_with(|| vec![None; view.returns.len()])[col] = Some(value);
        }
    }
    let headers: Vec<&str> = std::iter::once("Date")
        .chain(view.returns.iter().map(|r| r.symbol.as_str()))
        .collect();
    let rows: Vec<Vec<String>> = by_date
        .into_iter()
        .map(|(date, values)| {
            std::iter::once(date.to_string())
                .chain(values.into_iter().map(|v| table::num(v, 4)))
                .collect()
        })
        .collect();
    print!("{}", table::render(&headers, &rows));

    println!();
    for r in &view.returns {
        match r.total() {
            Some(total) => println!("{:<8} total return {:+.2}%", r.symbol, total * 100.0),
            None => println!("{:<8} no data in range", r.symbol),
        }
    }
    Ok(())
}

fn run_quote(
    config: &AppConfig,
    company: String,
    range: &RangeArgs,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    let request = PanelRequest::RealTime {
        company: Some(company),
        range: date_range(config, range)?,
        style: PriceChartStyle::Candlestick,
        search_clicked: true,
    };
    let PanelView::RealTime(view) = evaluate(&dashboard, &request)? else {
        bail!("unexpected view for quote request");
    };

    if let Some(path) = csv {
        export::write_file(path, &export::series_csv(&view.series)?)?;
        info!(path = %path.display(), "bars written");
    }

    if json {
        println!(
            "{}",
            export::time_values_json(&view.series.time_values(PriceField::Close))?
        );
        return Ok(());
    }

    println!("{}", quote_header(&view.company, &view.symbol, &view.series));
    print_bars(&view.series);
    Ok(())
}

fn quote_header(company: &str, symbol: &str, series: &PriceSeries) -> String {
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!(
            "{company} ({symbol}): {} bars, {first} to {last}",
            series.len()
        ),
        _ => format!("{company} ({symbol}): no bars in range"),
    }
}

fn print_bars(series: &PriceSeries) {
    let rows: Vec<Vec<String>> = series
        .bars()
        .iter()
        .map(|b| {
            vec![
                b.date.to_string(),
                table::num(b.open, 2),
                table::num(b.high, 2),
                table::num(b.low, 2),
                table::num(b.close, 2),
                table::num(b.adj_close, 2),
                table::num(b.volume, 0),
            ]
        })
        .collect();
    print!(
        "{}",
        table::render(
            &["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"],
            &rows
        )
    );
}

fn run_predict(
    config: &AppConfig,
    company: String,
    years: u8,
    range: &RangeArgs,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    let request = PanelRequest::Prediction {
        company: Some(company),
        range: date_range(config, range)?,
        horizon: HorizonYears::new(years)?,
    };
    let PanelView::Prediction(view) = evaluate(&dashboard, &request)? else {
        bail!("unexpected view for prediction request");
    };

    let forecast = match &view.forecast {
        ForecastOutcome::Ready(forecast) => forecast,
        ForecastOutcome::Unavailable(reason) => bail!("{reason}"),
    };

    if let Some(path) = csv {
        export::write_file(path, &export::forecast_csv(forecast)?)?;
        info!(path = %path.display(), "forecast written");
    }

    if json {
        println!("{}", export::time_values_json(&forecast.yhat_feed())?);
        return Ok(());
    }

    println!(
        "{} ({}): {} history rows, {} forecast days",
        view.company,
        view.symbol,
        forecast.history_len(),
        forecast.future().len()
    );
    let rows: Vec<Vec<String>> = forecast
        .future()
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                table::num(Some(r.yhat), 2),
                table::num(Some(r.yhat_lower), 2),
                table::num(Some(r.yhat_upper), 2),
            ]
        })
        .collect();
    print!(
        "{}",
        table::render(&["ds", "yhat", "yhat_lower", "yhat_upper"], &rows)
    );
    Ok(())
}

fn run_download(
    config: &AppConfig,
    symbols: Vec<String>,
    range: &RangeArgs,
    force: bool,
) -> Result<()> {
    let range = date_range(config, range)?;
    let symbols = if symbols.is_empty() {
        load_directory(config)?
            .entries()
            .iter()
            .map(|e| e.symbol.clone())
            .collect()
    } else {
        symbols
    };

    let provider = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))?;
    let cache = ParquetCache::new(&config.cache_dir);
    let summary = download_symbols(&provider, &cache, &symbols, range, force, &StdoutProgress);

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        bail!("{} of {} downloads failed", summary.failed, summary.total);
    }
    Ok(())
}

fn run_cache_status(config: &AppConfig, symbols: &[String]) -> Result<()> {
    let cache = ParquetCache::new(&config.cache_dir);
    let symbols = if symbols.is_empty() {
        cache.cached_symbols()
    } else {
        symbols.to_vec()
    };

    println!("Cache: {}", cache.cache_dir().display());
    println!("Symbols: {}", symbols.len());
    println!();

    let rows: Vec<Vec<String>> = cache
        .status(&symbols)
        .into_iter()
        .map(|s| {
            let range = match (s.start_date, s.end_date) {
                (Some(start), Some(end)) => format!("{start} to {end}"),
                _ => "not cached".to_string(),
            };
            let size = dir_size(&cache.cache_dir().join(format!("symbol={}", s.symbol)));
            vec![
                s.symbol,
                range,
                s.bar_count.map_or("-".to_string(), |n| n.to_string()),
                s.intervals.to_string(),
                table::format_size(size),
            ]
        })
        .collect();
    print!(
        "{}",
        table::render(&["Symbol", "Date Range", "Bars", "Intervals", "Size"], &rows)
    );
    Ok(())
}

/// Total size of the files under a symbol directory.
fn dir_size(path: &Path) -> u64 {
    let mut size = 0u64;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            match entry.metadata() {
                Ok(meta) if meta.is_dir() => size += dir_size(&entry.path()),
                Ok(meta) => size += meta.len(),
                Err(_) => {}
            }
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn predict_years_are_bounded() {
        assert!(Cli::try_parse_from(["stockstream", "predict", "Apple Inc", "--years", "4"]).is_ok());
        assert!(Cli::try_parse_from(["stockstream", "predict", "Apple Inc", "--years", "5"]).is_err());
        assert!(Cli::try_parse_from(["stockstream", "predict", "Apple Inc", "--years", "0"]).is_err());
    }

    #[test]
    fn range_defaults_to_config_start() {
        let config = AppConfig::default();
        let args = RangeArgs {
            start: None,
            end: Some("2023-06-30".into()),
        };
        let range = date_range(&config, &args).unwrap();
        assert_eq!(range.start, config.default_start);
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2023, 6, 30).unwrap());
    }

    #[test]
    fn export_flags_parse() {
        let cli = Cli::try_parse_from([
            "stockstream",
            "compare",
            "Apple Inc",
            "Microsoft Corporation",
            "--prices-csv",
            "prices.csv",
        ])
        .unwrap();
        let Commands::Compare {
            companies,
            prices_csv,
            csv,
            ..
        } = cli.command
        else {
            panic!("expected compare");
        };
        assert_eq!(companies.len(), 2);
        assert_eq!(prices_csv, Some(PathBuf::from("prices.csv")));
        assert!(csv.is_none());

        let cli = Cli::try_parse_from(["stockstream", "predict", "Apple Inc", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Predict { json: true, .. }));
    }

    #[test]
    fn quote_header_names_the_span() {
        let day = |d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap();
        let bars = (3..=5)
            .map(|d| {
                let mut bar = stockstream_core::PriceBar::empty(day(d));
                bar.close = Some(100.0);
                bar
            })
            .collect();
        let series = PriceSeries::new("AAPL", bars);
        assert_eq!(
            quote_header("Apple Inc", "AAPL", &series),
            "Apple Inc (AAPL): 3 bars, 2023-01-03 to 2023-01-05"
        );
        assert_eq!(
            quote_header("Apple Inc", "AAPL", &PriceSeries::empty("AAPL")),
            "Apple Inc (AAPL): no bars in range"
        );
    }

    #[test]
    fn bad_dates_are_reported() {
        let err = parse_date("2023-13-01").unwrap_err();
        assert!(err.to_string().contains("2023-13-01"));
    }
}
