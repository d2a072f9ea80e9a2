use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::{BacktestMetrics, TradeRecord};

/// Compute trade-level and distribution metrics from a completed run's
/// trades and equity curve, including the `0.01` loss floor in
/// `profit_factor` and the Sharpe fallback to zero when there are fewer
/// than two equity samples or zero variance.
pub fn compute_metrics(
    trades: &[TradeRecord],
    equity_curve: &[(DateTime<Utc>, Decimal)],
    initial_capital: Decimal,
) -> BacktestMetrics {
    let total_trades = trades.len() as u32;
    let winners: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl > Decimal::ZERO).collect();
    let losers: Vec<&TradeRecord> = trades.iter().filter(|t| t.pnl <= Decimal::ZERO).collect();

    let winning_trades = winners.len() as u32;
    let losing_trades = losers.len() as u32;

    let win_rate_pct = if total_trades > 0 {
        Decimal::from(winning_trades) / Decimal::from(total_trades) * Decimal::new(100, 0)
    } else {
        Decimal::ZERO
    };

    let avg_win_pct = mean_pct(&winners);
    let avg_loss_pct = mean_pct(&losers);

    let gross_wins: Decimal = winners.iter().map(|t| t.pnl).sum();
    let gross_losses: Decimal = losers.iter().map(|t| t.pnl).sum::<Decimal>().abs();
    let gross_losses_floored = gross_losses.max(Decimal::new(1, 2));
    let profit_factor = gross_wins / gross_losses_floored;

    let final_equity = equity_curve
        .last()
        .map(|(_, e)| *e)
        .unwrap_or(initial_capital);
    let total_return_pct = if initial_capital > Decimal::ZERO {
        (final_equity - initial_capital) / initial_capital * Decimal::new(100, 0)
    } else {
        Decimal::ZERO
    };

    let max_drawdown_pct = max_drawdown(equity_curve);
    let sharpe_ratio = sharpe(equity_curve);

    BacktestMetrics {
        total_trades,
        winning_trades,
        losing_trades,
        win_rate_pct,
        avg_win_pct,
        avg_loss_pct,
        profit_factor,
        total_return_pct,
        max_drawdown_pct,
        sharpe_ratio,
    }
}

fn mean_pct(cohort: &[&TradeRecord]) -> Decimal {
    if cohort.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = cohort.iter().map(|t| t.pnl_pct).sum();
    sum / Decimal::from(cohort.len() as u64)
}

fn max_drawdown(equity_curve: &[(DateTime<Utc>, Decimal)]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;
    for (_, equity) in equity_curve {
        if *equity > peak {
            peak = *equity;
        }
        if peak > Decimal::ZERO {
            let dd = (peak - *equity) / peak * Decimal::new(100, 0);
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// `sharpe = mean(r) * sqrt(252) / stdev(r)` over per-bar equity returns,
/// or zero when `stdev == 0` or fewer than two samples exist. Computed in
/// `f64` — this is a reporting statistic, not a ledger value, so the
/// decimal-everywhere rule for money does not apply here.
fn sharpe(equity_curve: &[(DateTime<Utc>, Decimal)]) -> Decimal {
    if equity_curve.len() < 3 {
        return Decimal::ZERO;
    }
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].1.to_f64()?;
            let curr = w[1].1.to_f64()?;
            if prev == 0.0 {
                None
            } else {
                Some((curr - prev) / prev)
            }
        })
        .collect();

    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stdev = variance.sqrt();

    if stdev <= 0.0 {
        return Decimal::ZERO;
    }

    let sharpe = mean * 252f64.sqrt() / stdev;
    Decimal::from_f64_retain(sharpe).unwrap_or(Decimal::ZERO)
}
