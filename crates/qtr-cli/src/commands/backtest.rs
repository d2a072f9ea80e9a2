use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use qtr_backtest::{BacktestConfig, BarEngine};
use qtr_domain::TradingMode;

use crate::ambient::AmbientSettings;
use crate::cli::RunArgs;
use crate::data;

pub fn execute(args: &RunArgs, ambient: &AmbientSettings) -> Result<()> {
    let market = args.market.into();
    let capital: Decimal = match &args.capital {
        Some(c) => c.parse().context("--capital is not a valid decimal")?,
        None => Decimal::new(100_000, 0),
    };

    let strategy = qtr_strategy::default_registry()
        .instantiate(&args.strategy)
        .with_context(|| format!("unknown strategy '{}'", args.strategy))?;

    let bars = data::load_bars(&args.data, market, &args.interval)?;
    if bars.is_empty() {
        anyhow::bail!("no bars loaded from {}", args.data);
    }

    let config = BacktestConfig {
        market,
        mode: TradingMode::Backtest,
        symbols: args.symbols.clone(),
        initial_capital: capital,
        seed: args.seed.unwrap_or(0),
        position_size_pct: ambient.position_size_pct,
        bar_history_len: ambient.bar_history_len.unwrap_or(50),
        base_slippage_bps_override: ambient.fill_logic.base_slippage_bps,
        commission_bps_override: ambient.fill_logic.commission_bps,
    };

    let mut engine = BarEngine::new(config, strategy);
    let report = engine.run(&bars).map_err(|e| anyhow::anyhow!("{e:?}"))?;

    print_report(&args.strategy, &report);
    Ok(())
}

fn print_report(strategy_name: &str, report: &qtr_backtest::BacktestReport) {
    println!("{}", "=".repeat(60));
    println!("BACKTEST REPORT");
    println!("{}", "=".repeat(60));
    println!("Strategy: {strategy_name}");
    println!("Trades: {}", report.trades.len());
    println!("Final equity: {}", report.final_equity);
    println!("{}", "-".repeat(60));
    println!("Win rate: {:.1}%", to_f64(report.metrics.win_rate_pct));
    println!("Profit factor: {:.2}", to_f64(report.metrics.profit_factor));
    println!("Total return: {:.2}%", to_f64(report.metrics.total_return_pct));
    println!("Max drawdown: {:.2}%", to_f64(report.metrics.max_drawdown_pct));
    println!("Sharpe: {:.2}", to_f64(report.metrics.sharpe_ratio));
    println!("{}", "=".repeat(60));
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
