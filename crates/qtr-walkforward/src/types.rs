use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_backtest::BacktestReport;
use qtr_domain::{Market, WalkForwardWindow};

/// Walk-forward validation configuration. Window sizing defaults follow the
/// spec's worked example: one trading year in-sample, one quarter OOS,
/// stepping forward by the OOS period so consecutive windows never overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkForwardConfig {
    pub market: Market,
    pub symbols: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_days: i64,
    pub oos_days: i64,
    pub step_days: i64,
    pub initial_capital: Decimal,
    pub seed: u64,
    pub position_size_pct: Decimal,
    pub bar_history_len: usize,
    pub base_slippage_bps_override: Option<Decimal>,
    pub commission_bps_override: Option<Decimal>,
}

impl WalkForwardConfig {
    pub fn test_defaults(symbol: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            market: Market::Us,
            symbols: vec![symbol.into()],
            start,
            end,
            is_days: 252,
            oos_days: 63,
            step_days: 63,
            initial_capital: Decimal::new(100_000, 0),
            seed: 42,
            position_size_pct: Decimal::new(10, 2),
            bar_history_len: 50,
            base_slippage_bps_override: None,
            commission_bps_override: None,
        }
    }
}

/// Per-window IS/OOS backtest pair plus the generated window bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowResult {
    pub window: WalkForwardWindow,
    pub in_sample: BacktestReport,
    pub out_of_sample: BacktestReport,
}

/// Aggregated walk-forward result. `oos_equity_curve` concatenates every
/// window's OOS equity curve in window order — each window starts its own
/// backtest from `initial_capital`, so curve values reset at window
/// boundaries rather than compounding across the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkForwardReport {
    pub windows: Vec<WindowResult>,
    pub avg_oos_return_pct: Decimal,
    pub avg_oos_sharpe: Decimal,
    pub avg_oos_win_rate_pct: Decimal,
    pub oos_equity_curve: Vec<(DateTime<Utc>, Decimal)>,
    /// IS average return minus OOS average return. Positive means in-sample
    /// outperformed out-of-sample, i.e. the strategy overfit the IS window.
    pub is_return_degradation: Decimal,
    pub is_sharpe_degradation: Decimal,
    pub overfitting_return_flag: bool,
    pub overfitting_sharpe_flag: bool,
}
