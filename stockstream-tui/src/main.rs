//! StockStream TUI: four-panel terminal dashboard with vim-style navigation.
//!
//! Panels:
//! 1. Stocks Performance Comparison: relative returns of several companies
//! 2. Real-Time Stock Price: raw bars and a candlestick chart for one company
//! 3. Stock Prediction: additive trend/seasonality forecast for one company
//! 4. About

mod app;
mod input;
mod theme;
mod ui;

#[cfg(test)]
mod test_support;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockstream_core::data::{build_provider, MarketDataProvider};
use stockstream_core::{AdditiveForecaster, AppConfig, Dashboard, TickerDirectory};

use crate::app::AppState;

type AppDashboard = Dashboard<Box<dyn MarketDataProvider>, AdditiveForecaster>;

#[derive(Parser)]
#[command(name = "stockstream-tui", about = "StockStream terminal dashboard")]
struct Cli {
    /// Configuration file (defaults to $STOCKSTREAM_CONFIG, then the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = dirs::config_dir();
    let config = AppConfig::load(cli.config.as_deref(), config_dir.as_deref())
        .context("failed to load configuration")?;

    init_logging(&config, config_dir.as_deref())?;

    let directory = TickerDirectory::from_path(&config.tickers_file).with_context(|| {
        format!(
            "failed to load ticker directory from {}",
            config.tickers_file.display()
        )
    })?;
    info!(companies = directory.len(), "ticker directory loaded");

    let provider = build_provider(&config).context("failed to build market data provider")?;
    let dashboard = Dashboard::new(directory, provider, AdditiveForecaster::default())
        .with_loading_delay(config.loading_delay());

    let today = chrono::Local::now().date_naive();
    let companies = dashboard
        .directory()
        .names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let mut app = AppState::new(companies, config.default_start, today);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &dashboard);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("stockstream-tui exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    dashboard: &AppDashboard,
) -> Result<()> {
    loop {
        // 1. Re-evaluate the active panel after a control change, showing a
        // loading frame first since the fetch blocks.
        if app.dirty {
            app.set_warning("Loading...");
            terminal.draw(|f| ui::draw(f, app))?;
            app.refresh(dashboard);
        }

        // 2. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &AppConfig, config_dir: Option<&Path>) -> Result<()> {
    let path = config.log_file.clone().unwrap_or_else(|| {
        config_dir
            .map(|d| d.join("stockstream"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stockstream.log")
    });
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STOCKSTREAM_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
