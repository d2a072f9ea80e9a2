use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Bar, Market, Position, Signal, TradingMode};

/// Bounded recent-bars window: keeps the most recent `max_len` bars, tail-first.
/// Deterministic truncation — no lookahead is possible since bars are only
/// ever pushed in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub struct RecentBarsWindow {
    max_len: usize,
    bars: Vec<Bar>,
}

impl RecentBarsWindow {
    pub fn new(max_len: usize) -> Self {
        debug_assert!(max_len > 0, "RecentBarsWindow.max_len must be > 0");
        Self {
            max_len,
            bars: Vec::new(),
        }
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
        if self.bars.len() > self.max_len {
            let start = self.bars.len() - self.max_len;
            self.bars.drain(..start);
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }
}

/// Everything a strategy may observe for the current bar. No broker/DB
/// handles; no wall clock. `current_time` is the bar's own timestamp, not
/// `Utc::now()` — the strategy must be pure with respect to external state.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyContext {
    pub market: Market,
    pub mode: TradingMode,
    pub symbol: String,
    pub current_time: DateTime<Utc>,
    pub current_price: Decimal,
    pub position: Option<Position>,
    pub recent: RecentBarsWindow,
}

impl StrategyContext {
    pub fn new(
        market: Market,
        mode: TradingMode,
        symbol: impl Into<String>,
        current_time: DateTime<Utc>,
        current_price: Decimal,
        position: Option<Position>,
        recent: RecentBarsWindow,
    ) -> Self {
        Self {
            market,
            mode,
            symbol: symbol.into(),
            current_time,
            current_price,
            position,
            recent,
        }
    }
}

/// The lifecycle every loaded strategy moves through. `Running` carries no
/// extra payload here — per-symbol state lives inside the strategy
/// implementation itself, which this host treats as opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StrategyLifecycle {
    Uninitialised,
    Initialised,
    Running,
    Reset,
}

/// The contract every loaded strategy satisfies, regardless of whether it
/// came from the sandboxed bundle loader or the legacy class-style loader.
/// `on_bar` emits [`Signal`]s, not raw order intents — sizing and order
/// construction is the bar engine's / order manager's job, not the
/// strategy's. This keeps a single signal-resolution algorithm
/// (see `qtr-backtest`) serving both loader paths.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn initialize(&mut self) {}

    /// Restore the strategy to its freshly-initialised state. Required for
    /// walk-forward: each window runs against a strategy that has been reset,
    /// not a brand new instance, unless the caller explicitly constructs one.
    fn reset(&mut self) {}

    fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<Signal>;

    fn on_fill(&mut self, _fill: &qtr_domain::Fill) {}

    fn finalize(&mut self) {}
}
