//! Multi-symbol fetch into a price table.

use tracing::{debug, info};

use super::provider::{DataError, MarketDataProvider};
use crate::domain::{DateRange, PriceSeries, PriceTable};

/// Fetch every symbol over `range` in the given order.
///
/// A symbol the source does not know becomes an empty series; any other
/// failure aborts the whole table. An inverted range or an empty symbol list
/// yields an empty table without touching the provider.
pub fn fetch_table<P, S>(
    provider: &P,
    symbols: &[S],
    range: DateRange,
) -> Result<PriceTable, DataError>
where
    P: MarketDataProvider + ?Sized,
    S: AsRef<str>,
{
    if symbols.is_empty() || range.is_inverted() {
        debug!(symbols = symbols.len(), "nothing to fetch");
        return Ok(PriceTable::new(
            symbols
                .iter()
                .map(|s| PriceSeries::empty(s.as_ref()))
                .collect(),
        ));
    }

    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.as_ref();
        match provider.fetch(symbol, range) {
            Ok(fetched) => series.push(fetched.series),
            Err(e) if e.is_missing_data() => {
                debug!(symbol, error = %e, "no data for symbol");
                series.push(PriceSeries::empty(symbol));
            }
            Err(e) => return Err(e),
        }
    }

    let table = PriceTable::new(series);
    info!(
        provider = provider.name(),
        symbols = symbols.len(),
        rows = table.row_count(),
        "price table fetched"
    );
    Ok(table)
}
