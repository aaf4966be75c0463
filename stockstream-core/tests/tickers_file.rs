//! The shipped ticker reference table parses and resolves.

use stockstream_core::TickerDirectory;

const TICKERS: &str = include_str!("../../tickers.csv");

#[test]
fn shipped_tickers_load() {
    let directory = TickerDirectory::from_reader(TICKERS.as_bytes()).unwrap();
    assert!(directory.len() >= 20);
    assert_eq!(directory.lookup("Apple Inc"), Some("AAPL"));
    assert_eq!(directory.lookup("Berkshire Hathaway Inc"), Some("BRK-B"));
}

#[test]
fn shipped_symbols_are_unique() {
    let directory = TickerDirectory::from_reader(TICKERS.as_bytes()).unwrap();
    let mut symbols: Vec<&str> = directory.entries().iter().map(|e| e.symbol.as_str()).collect();
    let total = symbols.len();
    symbols.sort_unstable();
    symbols.dedup();
    assert_eq!(symbols.len(), total);
}
