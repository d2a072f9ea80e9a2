use anyhow::{Context, Result};
use rust_decimal::Decimal;

use qtr_domain::TradingMode;
use qtr_risk::RiskConfig;
use qtr_runtime::{Broker, DataFeed, LiveRuntime, PaperBroker, RuntimeConfig, SystemClock, TracingEventSink};

use crate::ambient::AmbientSettings;
use crate::cli::RunArgs;
use crate::data;
use crate::replay_feed::ReplayDataFeed;

/// `paper` and `live` both drive the same [`LiveRuntime`] loop against the
/// in-tree simulated broker — this crate ships no real exchange adapter, so
/// `live` differs from `paper` only in that it insists broker credentials
/// are actually configured before it will start.
pub fn execute(args: &RunArgs, ambient: &AmbientSettings, mode: TradingMode) -> Result<()> {
    let market = args.market.into();
    let capital: Decimal = match &args.capital {
        Some(c) => c.parse().context("--capital is not a valid decimal")?,
        None => Decimal::new(100_000, 0),
    };

    let _secrets = qtr_config::resolve_secrets_for_mode(mode).context("broker credentials not configured")?;

    let strategy = qtr_strategy::default_registry()
        .instantiate(&args.strategy)
        .with_context(|| format!("unknown strategy '{}'", args.strategy))?;

    let bars = data::load_bars(&args.data, market, &args.interval)?;
    if bars.is_empty() {
        anyhow::bail!("no bars loaded from {}", args.data);
    }

    let seed = args.seed.unwrap_or(0);
    let risk: RiskConfig = ambient.risk.clone().into();

    let config = RuntimeConfig {
        market,
        mode,
        initial_capital: capital,
        position_size_pct: ambient.position_size_pct,
        bar_history_len: ambient.bar_history_len.unwrap_or(50),
        risk,
        max_feed_retries: 3,
    };

    let mut feed = ReplayDataFeed::new(bars);
    let mut broker = PaperBroker::new(market, seed, capital);
    feed.connect().context("data feed connect failed")?;
    broker.connect().context("broker connect failed")?;

    let mut runtime = LiveRuntime::new(config, strategy, feed, broker, SystemClock, TracingEventSink);
    runtime.run().map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(equity = %runtime.current_equity(), "run complete");
    Ok(())
}
