//! Rolls a strategy through generated walk-forward windows, running a fresh
//! backtest engine (and a fresh strategy instance) over each window's
//! in-sample and out-of-sample bars. No state — strategy or otherwise —
//! carries over between IS and OOS, or between consecutive windows: each
//! half is an independent, from-scratch backtest. This mirrors how the
//! window runner builds a brand new engine per half rather than resetting
//! a shared instance.

use rust_decimal::Decimal;

use qtr_backtest::{BacktestConfig, BacktestError, BarEngine};
use qtr_domain::{generate_windows, Bar};
use qtr_strategy::Strategy;

use crate::types::{WalkForwardConfig, WalkForwardReport, WindowResult};

#[derive(Debug)]
pub enum WalkForwardError {
    NoWindowsGenerated,
    Backtest(BacktestError),
}

impl std::fmt::Display for WalkForwardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkForwardError::NoWindowsGenerated => {
                write!(f, "no walk-forward windows fit inside the given date range")
            }
            WalkForwardError::Backtest(e) => write!(f, "window backtest failed: {e}"),
        }
    }
}

impl std::error::Error for WalkForwardError {}

impl From<BacktestError> for WalkForwardError {
    fn from(e: BacktestError) -> Self {
        WalkForwardError::Backtest(e)
    }
}

fn backtest_config_for(config: &WalkForwardConfig, symbol: &str) -> BacktestConfig {
    BacktestConfig {
        market: config.market,
        mode: qtr_domain::TradingMode::Backtest,
        symbols: vec![symbol.to_string()],
        initial_capital: config.initial_capital,
        seed: config.seed,
        position_size_pct: config.position_size_pct,
        bar_history_len: config.bar_history_len,
        base_slippage_bps_override: config.base_slippage_bps_override,
        commission_bps_override: config.commission_bps_override,
    }
}

/// Run walk-forward validation over `bars` (all symbols pre-filtered by the
/// caller to `config.symbols`; multi-symbol runs are not yet supported —
/// pass one symbol's worth of bars at a time). Windows whose IS or OOS half
/// has no bars are skipped with a warning rather than aborting the run.
pub fn run(
    config: &WalkForwardConfig,
    bars: &[Bar],
    mut strategy_factory: impl FnMut() -> Box<dyn Strategy>,
) -> Result<WalkForwardReport, WalkForwardError> {
    let symbol = config
        .symbols
        .first()
        .cloned()
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let windows = generate_windows(config.start, config.end, config.is_days, config.oos_days, config.step_days);
    if windows.is_empty() {
        return Err(WalkForwardError::NoWindowsGenerated);
    }

    let mut results = Vec::new();
    let mut oos_equity_curve = Vec::new();

    for window in windows {
        let is_bars: Vec<Bar> = bars
            .iter()
            .filter(|b| b.timestamp >= window.is_start && b.timestamp < window.is_end)
            .cloned()
            .collect();
        let oos_bars: Vec<Bar> = bars
            .iter()
            .filter(|b| b.timestamp >= window.oos_start && b.timestamp < window.oos_end)
            .cloned()
            .collect();

        if is_bars.is_empty() || oos_bars.is_empty() {
            tracing::warn!(window_id = window.window_id, "skipping window with no bars in IS or OOS half");
            continue;
        }

        let is_config = backtest_config_for(config, &symbol);
        let mut is_engine = BarEngine::new(is_config, strategy_factory());
        let in_sample = is_engine.run(&is_bars)?;

        let oos_config = backtest_config_for(config, &symbol);
        let mut oos_engine = BarEngine::new(oos_config, strategy_factory());
        let out_of_sample = oos_engine.run(&oos_bars)?;

        oos_equity_curve.extend(out_of_sample.equity_curve.iter().cloned());

        results.push(WindowResult {
            window,
            in_sample,
            out_of_sample,
        });
    }

    Ok(aggregate(results, oos_equity_curve))
}

fn aggregate(windows: Vec<WindowResult>, oos_equity_curve: Vec<(chrono::DateTime<chrono::Utc>, Decimal)>) -> WalkForwardReport {
    if windows.is_empty() {
        return WalkForwardReport {
            windows,
            avg_oos_return_pct: Decimal::ZERO,
            avg_oos_sharpe: Decimal::ZERO,
            avg_oos_win_rate_pct: Decimal::ZERO,
            oos_equity_curve,
            is_return_degradation: Decimal::ZERO,
            is_sharpe_degradation: Decimal::ZERO,
            overfitting_return_flag: false,
            overfitting_sharpe_flag: false,
        };
    }

    let n = Decimal::from(windows.len() as u64);
    let sum_oos_return: Decimal = windows.iter().map(|w| w.out_of_sample.metrics.total_return_pct).sum();
    let sum_oos_sharpe: Decimal = windows.iter().map(|w| w.out_of_sample.metrics.sharpe_ratio).sum();
    let sum_oos_win_rate: Decimal = windows.iter().map(|w| w.out_of_sample.metrics.win_rate_pct).sum();
    let sum_is_return: Decimal = windows.iter().map(|w| w.in_sample.metrics.total_return_pct).sum();
    let sum_is_sharpe: Decimal = windows.iter().map(|w| w.in_sample.metrics.sharpe_ratio).sum();

    let avg_oos_return_pct = sum_oos_return / n;
    let avg_oos_sharpe = sum_oos_sharpe / n;
    let avg_oos_win_rate_pct = sum_oos_win_rate / n;
    let avg_is_return = sum_is_return / n;
    let avg_is_sharpe = sum_is_sharpe / n;

    let is_return_degradation = avg_is_return - avg_oos_return_pct;
    let is_sharpe_degradation = avg_is_sharpe - avg_oos_sharpe;

    WalkForwardReport {
        windows,
        avg_oos_return_pct,
        avg_oos_sharpe,
        avg_oos_win_rate_pct,
        oos_equity_curve,
        is_return_degradation,
        is_sharpe_degradation,
        overfitting_return_flag: is_return_degradation > Decimal::new(10, 0),
        overfitting_sharpe_flag: is_sharpe_degradation > Decimal::new(5, 1),
    }
}
