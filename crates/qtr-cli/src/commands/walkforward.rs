use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use qtr_walkforward::{format_report, run, WalkForwardConfig};

use crate::ambient::AmbientSettings;
use crate::cli::WalkforwardArgs;
use crate::data;

pub fn execute(args: &WalkforwardArgs, ambient: &AmbientSettings) -> Result<()> {
    let run_args = &args.run;
    let market = run_args.market.into();
    let capital: Decimal = match &run_args.capital {
        Some(c) => c.parse().context("--capital is not a valid decimal")?,
        None => Decimal::new(100_000, 0),
    };

    let bars = data::load_bars(&run_args.data, market, &run_args.interval)?;
    if bars.is_empty() {
        anyhow::bail!("no bars loaded from {}", run_args.data);
    }

    let config = WalkForwardConfig {
        market,
        symbols: run_args.symbols.clone(),
        start: parse_datetime(&args.start).context("--start is not a valid date/timestamp")?,
        end: parse_datetime(&args.end).context("--end is not a valid date/timestamp")?,
        is_days: args.is_days.unwrap_or(ambient.walkforward.is_days),
        oos_days: args.oos_days.unwrap_or(ambient.walkforward.oos_days),
        step_days: args.step_days.unwrap_or(ambient.walkforward.step_days),
        initial_capital: capital,
        seed: run_args.seed.unwrap_or(0),
        position_size_pct: ambient.position_size_pct,
        bar_history_len: ambient.bar_history_len.unwrap_or(50),
        base_slippage_bps_override: ambient.fill_logic.base_slippage_bps,
        commission_bps_override: ambient.fill_logic.commission_bps,
    };

    let strategy_name = run_args.strategy.clone();
    let registry = qtr_strategy::default_registry();
    registry
        .meta(&strategy_name)
        .with_context(|| format!("unknown strategy '{strategy_name}'"))?;

    let report = run(&config, &bars, || {
        registry
            .instantiate(&strategy_name)
            .expect("strategy presence already validated")
    })
    .map_err(|e| anyhow::anyhow!("{e:?}"))?;

    println!("{}", format_report(&run_args.strategy, &report));
    Ok(())
}

/// Accepts either a bare `YYYY-MM-DD` date (midnight UTC) or a full RFC3339
/// timestamp, since `--start`/`--end` are most naturally given as dates.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid")))
}
