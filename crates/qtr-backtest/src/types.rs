use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Market, PositionSide, TradingMode};

/// Backtest run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BacktestConfig {
    pub market: Market,
    pub mode: TradingMode,
    pub symbols: Vec<String>,
    pub initial_capital: Decimal,
    pub seed: u64,
    /// Fraction of capital committed to a single new position, e.g. `0.1` = 10%.
    pub position_size_pct: Decimal,
    pub bar_history_len: usize,
    pub base_slippage_bps_override: Option<Decimal>,
    pub commission_bps_override: Option<Decimal>,
}

impl BacktestConfig {
    /// Minimal config for unit tests: a single symbol, no cost overrides.
    /// Not a "run in anger" default — real CLI runs should set explicit
    /// `symbols`/`seed`/cost overrides from the resolved [`qtr_domain::PolicySet`].
    pub fn test_defaults(symbol: impl Into<String>) -> Self {
        Self {
            market: Market::Us,
            mode: TradingMode::Backtest,
            symbols: vec![symbol.into()],
            initial_capital: Decimal::new(100_000, 0),
            seed: 42,
            position_size_pct: Decimal::new(10, 2),
            bar_history_len: 50,
            base_slippage_bps_override: None,
            commission_bps_override: None,
        }
    }
}

/// A closed round-trip trade, emitted when a position is fully closed
/// (whether by signal exit or stream-exhaustion force-close).
#[derive(Clone, Debug, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    /// Clamped to >= 1 even when entry and exit fall within the same day.
    pub holding_days: i64,
    pub forced: bool,
}

/// Trade-level and distribution metrics computed at completion.
#[derive(Clone, Debug, PartialEq)]
pub struct BacktestMetrics {
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub win_rate_pct: Decimal,
    pub avg_win_pct: Decimal,
    pub avg_loss_pct: Decimal,
    pub profit_factor: Decimal,
    pub total_return_pct: Decimal,
    pub max_drawdown_pct: Decimal,
    pub sharpe_ratio: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BacktestReport {
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<(DateTime<Utc>, Decimal)>,
    pub metrics: BacktestMetrics,
    pub final_equity: Decimal,
}
