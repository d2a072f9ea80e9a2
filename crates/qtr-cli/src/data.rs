//! CSV bar loading. The engine has no built-in market-data provider — this
//! is the minimal on-disk format the CLI accepts so the backtest, walk-forward,
//! and paper/live entry points have something to run against.
//!
//! Expected header: `symbol,timestamp,open,high,low,close,volume`. Rows are
//! sorted by timestamp after loading since the engine requires a monotonic
//! stream and CSV exports aren't guaranteed to be in order.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Bar, Market};

pub fn load_bars(path: impl AsRef<Path>, market: Market, interval: &str) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open bar data file: {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read csv record from {}", path.display()))?;
        let bar = parse_record(&record, market, interval)
            .with_context(|| format!("parse csv record from {}", path.display()))?;
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_record(record: &csv::StringRecord, market: Market, interval: &str) -> Result<Bar> {
    let symbol = record.get(0).context("missing symbol column")?;
    let timestamp: DateTime<Utc> = record
        .get(1)
        .context("missing timestamp column")?
        .parse()
        .context("timestamp is not RFC3339")?;
    let open: Decimal = record.get(2).context("missing open column")?.parse()?;
    let high: Decimal = record.get(3).context("missing high column")?.parse()?;
    let low: Decimal = record.get(4).context("missing low column")?.parse()?;
    let close: Decimal = record.get(5).context("missing close column")?.parse()?;
    let volume: Decimal = record.get(6).context("missing volume column")?.parse()?;

    Bar::new(market, symbol, timestamp, open, high, low, close, volume, interval)
        .map_err(|e| anyhow::anyhow!("invalid bar: {e}"))
}
