//! A [`DataFeed`] that replays a fixed, pre-loaded bar sequence. Stands in
//! for a real exchange market-data adapter (out of scope for this crate) so
//! `paper` and `live` runs have something to drive the runtime loop with.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use qtr_domain::Bar;
use qtr_runtime::{DataFeed, DataFeedError};

pub struct ReplayDataFeed {
    bars: VecDeque<Bar>,
    all_bars: Vec<Bar>,
}

impl ReplayDataFeed {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars: bars.clone().into(),
            all_bars: bars,
        }
    }
}

impl DataFeed for ReplayDataFeed {
    fn connect(&mut self) -> Result<(), DataFeedError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), DataFeedError> {
        Ok(())
    }

    fn subscribe_candles(&mut self, _symbols: &[String], _interval: &str) -> Result<(), DataFeedError> {
        Ok(())
    }

    fn unsubscribe(&mut self) -> Result<(), DataFeedError> {
        Ok(())
    }

    fn next_bar(&mut self) -> Option<Result<Bar, DataFeedError>> {
        self.bars.pop_front().map(Ok)
    }

    fn get_historical(
        &self,
        symbol: &str,
        _interval: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, DataFeedError> {
        let mut out: Vec<Bar> = self
            .all_bars
            .iter()
            .filter(|b| b.symbol == symbol && b.timestamp >= start && end.map(|e| b.timestamp <= e).unwrap_or(true))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            out.truncate(limit);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtr_domain::Market;
    use rust_decimal_macros::dec;

    fn bar(ts: DateTime<Utc>) -> Bar {
        Bar::new(Market::Us, "AAPL", ts, dec!(1), dec!(1), dec!(1), dec!(1), dec!(1), "1d").unwrap()
    }

    #[test]
    fn next_bar_drains_in_order() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::days(1);
        let mut feed = ReplayDataFeed::new(vec![bar(t0), bar(t1)]);
        assert_eq!(feed.next_bar().unwrap().unwrap().timestamp, t0);
        assert_eq!(feed.next_bar().unwrap().unwrap().timestamp, t1);
        assert!(feed.next_bar().is_none());
    }
}
