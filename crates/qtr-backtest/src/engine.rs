//! The bar engine: the single per-bar algorithm that drives a strategy
//! through a bar stream, resolves its signals against tracked positions via
//! the shared fill simulator, and accumulates an equity curve and trade
//! ledger. Bar `k` only ever sees bars `[0..k-1]` through the strategy's
//! recent-bars window — bar `k` itself is handed to `on_bar` as the current
//! close, never queued ahead of time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Bar, Order, OrderSide, OrderType, OrderValidationError, Position, SignalAction};
use qtr_fillsim::{FillSimConfig, FillSimError, FillSimulator};
use qtr_risk::PositionTracker;
use qtr_strategy::{RecentBarsWindow, Strategy, StrategyContext, StrategyHost, StrategyHostError};

use crate::metrics::compute_metrics;
use crate::types::{BacktestConfig, BacktestReport, TradeRecord};

#[derive(Debug)]
pub enum BacktestError {
    EmptyBarStream,
    NonMonotonicTimestamp {
        symbol: String,
        at: DateTime<Utc>,
    },
    StrategyHost(StrategyHostError),
    FillSim(FillSimError),
    OrderValidation(OrderValidationError),
}

impl std::fmt::Display for BacktestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BacktestError::EmptyBarStream => write!(f, "bar stream is empty"),
            BacktestError::NonMonotonicTimestamp { symbol, at } => write!(
                f,
                "bar timestamp for {symbol} at {at} does not advance the stream"
            ),
            BacktestError::StrategyHost(e) => write!(f, "strategy host error: {e}"),
            BacktestError::FillSim(e) => write!(f, "fill simulation error: {e}"),
            BacktestError::OrderValidation(e) => write!(f, "order validation error: {e}"),
        }
    }
}

impl std::error::Error for BacktestError {}

impl From<StrategyHostError> for BacktestError {
    fn from(e: StrategyHostError) -> Self {
        BacktestError::StrategyHost(e)
    }
}

impl From<FillSimError> for BacktestError {
    fn from(e: FillSimError) -> Self {
        BacktestError::FillSim(e)
    }
}

impl From<OrderValidationError> for BacktestError {
    fn from(e: OrderValidationError) -> Self {
        BacktestError::OrderValidation(e)
    }
}

/// Drives one strategy through a bar stream. Single strategy, single run —
/// the walk-forward validator owns resetting and re-running across windows.
pub struct BarEngine {
    config: BacktestConfig,
    host: StrategyHost,
    fillsim: FillSimulator,
    tracker: PositionTracker,
    recent: BTreeMap<String, RecentBarsWindow>,
    last_timestamp: Option<DateTime<Utc>>,
    total_realized_pnl: Decimal,
    total_fees: Decimal,
    equity_curve: Vec<(DateTime<Utc>, Decimal)>,
    trades: Vec<TradeRecord>,
}

impl BarEngine {
    pub fn new(config: BacktestConfig, strategy: Box<dyn Strategy>) -> Self {
        let mut fillsim_config = FillSimConfig::new(config.seed);
        fillsim_config.base_slippage_bps_override = config.base_slippage_bps_override;
        fillsim_config.commission_bps_override = config.commission_bps_override;

        Self {
            fillsim: FillSimulator::new(fillsim_config),
            host: StrategyHost::new(strategy),
            tracker: PositionTracker::new(),
            recent: BTreeMap::new(),
            last_timestamp: None,
            total_realized_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            equity_curve: Vec::new(),
            trades: Vec::new(),
            config,
        }
    }

    pub fn run(&mut self, bars: &[Bar]) -> Result<BacktestReport, BacktestError> {
        if bars.is_empty() {
            return Err(BacktestError::EmptyBarStream);
        }

        self.host.initialize()?;

        for bar in bars {
            self.process_bar(bar)?;
        }

        let last_timestamp = self.last_timestamp.expect("non-empty stream sets last_timestamp");
        self.force_close_all(last_timestamp)?;
        self.host.finalize()?;

        let metrics = compute_metrics(&self.trades, &self.equity_curve, self.config.initial_capital);
        let final_equity = self
            .equity_curve
            .last()
            .map(|(_, e)| *e)
            .unwrap_or(self.config.initial_capital);

        Ok(BacktestReport {
            trades: self.trades.clone(),
            equity_curve: self.equity_curve.clone(),
            metrics,
            final_equity,
        })
    }

    fn process_bar(&mut self, bar: &Bar) -> Result<(), BacktestError> {
        if let Some(last) = self.last_timestamp {
            if bar.timestamp <= last {
                return Err(BacktestError::NonMonotonicTimestamp {
                    symbol: bar.symbol.clone(),
                    at: bar.timestamp,
                });
            }
        }
        self.last_timestamp = Some(bar.timestamp);

        self.tracker.update_price(&bar.symbol, bar.close, bar.timestamp);

        let window = self
            .recent
            .entry(bar.symbol.clone())
            .or_insert_with(|| RecentBarsWindow::new(self.config.bar_history_len));

        let ctx = StrategyContext::new(
            self.config.market,
            self.config.mode,
            bar.symbol.clone(),
            bar.timestamp,
            bar.close,
            self.tracker.get(&bar.symbol).cloned(),
            window.clone(),
        );

        let signals = self.host.on_bar(bar, &ctx)?;

        if let Some(window) = self.recent.get_mut(&bar.symbol) {
            window.push(bar.clone());
        }

        for signal in &signals {
            self.resolve_signal(signal, bar)?;
        }

        self.mark_equity(bar.timestamp);
        Ok(())
    }

    fn resolve_signal(
        &mut self,
        signal: &qtr_domain::Signal,
        bar: &Bar,
    ) -> Result<(), BacktestError> {
        let existing = self.tracker.get(&signal.symbol).cloned();
        match signal.action {
            SignalAction::EnterLong => {
                if existing.as_ref().map_or(true, |p| !p.is_open()) {
                    self.open_position(OrderSide::Buy, bar, &signal.strategy_name)?;
                }
            }
            SignalAction::EnterShort => {
                if existing.as_ref().map_or(true, |p| !p.is_open()) {
                    self.open_position(OrderSide::Sell, bar, &signal.strategy_name)?;
                }
            }
            SignalAction::ExitLong => {
                if let Some(pos) = existing.filter(|p| p.is_open() && p.side == qtr_domain::PositionSide::Long) {
                    self.close_position(OrderSide::Sell, bar, pos, &signal.strategy_name)?;
                }
            }
            SignalAction::ExitShort => {
                if let Some(pos) = existing.filter(|p| p.is_open() && p.side == qtr_domain::PositionSide::Short) {
                    self.close_position(OrderSide::Buy, bar, pos, &signal.strategy_name)?;
                }
            }
        }
        Ok(())
    }

    fn open_position(
        &mut self,
        side: OrderSide,
        bar: &Bar,
        strategy_name: &str,
    ) -> Result<(), BacktestError> {
        if bar.close <= Decimal::ZERO {
            return Ok(());
        }
        let notional = self.config.initial_capital * self.config.position_size_pct;
        let quantity = notional / bar.close;
        if quantity <= Decimal::ZERO {
            return Ok(());
        }

        let order = Order::new(
            self.config.market,
            self.config.mode,
            bar.symbol.clone(),
            side,
            OrderType::Market,
            quantity,
            None,
            None,
            bar.timestamp,
            strategy_name,
        )?;
        let fill = self.fillsim.simulate_fill(&order, bar.close, bar.timestamp)?;
        self.total_fees += fill.commission;
        self.total_realized_pnl += self.tracker.apply_fill(self.config.market, &fill);
        self.host.on_fill(&fill)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn close_position(
        &mut self,
        side: OrderSide,
        bar: &Bar,
        position: Position,
        strategy_name: &str,
    ) -> Result<(), BacktestError> {
        self.execute_close(side, &position.symbol, position, bar.timestamp, bar.close, strategy_name, false)
    }

    fn execute_close(
        &mut self,
        side: OrderSide,
        symbol: &str,
        position: Position,
        at: DateTime<Utc>,
        reference_price: Decimal,
        strategy_name: &str,
        forced: bool,
    ) -> Result<(), BacktestError> {
        let order = Order::new(
            self.config.market,
            self.config.mode,
            symbol,
            side,
            OrderType::Market,
            position.quantity,
            None,
            None,
            at,
            strategy_name,
        )?;
        let fill = self.fillsim.simulate_fill(&order, reference_price, at)?;
        self.total_fees += fill.commission;
        let realized = self.tracker.apply_fill(self.config.market, &fill);
        self.total_realized_pnl += realized;
        self.host.on_fill(&fill)?;

        let denom = position.avg_entry_price * position.quantity;
        let pnl_pct = if denom > Decimal::ZERO {
            realized / denom * Decimal::new(100, 0)
        } else {
            Decimal::ZERO
        };
        let holding_days = (fill.timestamp - position.opened_at).num_days().max(1);

        self.trades.push(TradeRecord {
            symbol: symbol.to_string(),
            side: position.side,
            entry_price: position.avg_entry_price,
            exit_price: fill.price,
            quantity: position.quantity,
            pnl: realized,
            pnl_pct,
            opened_at: position.opened_at,
            closed_at: fill.timestamp,
            holding_days,
            forced,
        });
        Ok(())
    }

    fn mark_equity(&mut self, at: DateTime<Utc>) {
        let unrealized: Decimal = self.tracker.positions().map(|p| p.unrealized_pnl()).sum();
        let equity = self.config.initial_capital + self.total_realized_pnl - self.total_fees + unrealized;
        self.equity_curve.push((at, equity));
    }

    /// Force-close every still-open position at its last marked price. Runs
    /// once after the stream is exhausted so the report never carries open
    /// exposure with no corresponding trade.
    fn force_close_all(&mut self, at: DateTime<Utc>) -> Result<(), BacktestError> {
        let open: Vec<Position> = self.tracker.positions().cloned().collect();
        for position in open {
            let side = match position.side {
                qtr_domain::PositionSide::Long => OrderSide::Sell,
                qtr_domain::PositionSide::Short => OrderSide::Buy,
            };
            let reference_price = position.current_price;
            let symbol = position.symbol.clone();
            self.execute_close(side, &symbol, position, at, reference_price, "force_close", true)?;
        }
        self.mark_equity(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qtr_domain::{Market, Signal, TradingMode};
    use rust_decimal_macros::dec;

    fn bar(symbol: &str, day: i64, close: Decimal) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
        Bar::new(
            Market::Us,
            symbol,
            ts,
            close,
            close + dec!(1),
            close - dec!(1),
            close,
            dec!(1000),
            "1d",
        )
        .unwrap()
    }

    /// Enters long on bar index 2, exits on bar index 5. Verifies the
    /// strategy never sees a bar's own close before it arrives by only
    /// acting on `ctx.recent` contents, not on `bar` itself, for its entry
    /// trigger.
    struct EnterThenExit {
        bar_index: u32,
    }

    impl Strategy for EnterThenExit {
        fn name(&self) -> &str {
            "enter_then_exit"
        }

        fn reset(&mut self) {
            self.bar_index = 0;
        }

        fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<Signal> {
            let idx = self.bar_index;
            self.bar_index += 1;
            assert_eq!(ctx.recent.len() as u32, idx, "recent window must lag current bar by exactly one");

            if idx == 2 {
                vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::EnterLong,
                    dec!(1),
                    bar.close,
                    self.name(),
                )]
            } else if idx == 5 {
                vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::ExitLong,
                    dec!(1),
                    bar.close,
                    self.name(),
                )]
            } else {
                Vec::new()
            }
        }
    }

    fn bars() -> Vec<Bar> {
        (0..8)
            .map(|i| bar("AAPL", i, dec!(100) + Decimal::from(i)))
            .collect()
    }

    #[test]
    fn long_entry_and_exit_round_trips_into_a_trade() {
        let config = BacktestConfig::test_defaults("AAPL");
        let mut engine = BarEngine::new(config, Box::new(EnterThenExit { bar_index: 0 }));
        let report = engine.run(&bars()).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.side, qtr_domain::PositionSide::Long);
        assert!(!trade.forced);
        assert!(trade.exit_price > trade.entry_price);
    }

    #[test]
    fn run_is_deterministic_for_the_same_seed() {
        let config = BacktestConfig::test_defaults("AAPL");
        let mut engine1 = BarEngine::new(config.clone(), Box::new(EnterThenExit { bar_index: 0 }));
        let report1 = engine1.run(&bars()).unwrap();

        let mut engine2 = BarEngine::new(config, Box::new(EnterThenExit { bar_index: 0 }));
        let report2 = engine2.run(&bars()).unwrap();

        assert_eq!(report1.equity_curve, report2.equity_curve);
        assert_eq!(report1.trades, report2.trades);
    }

    struct AlwaysLong;

    impl Strategy for AlwaysLong {
        fn name(&self) -> &str {
            "always_long"
        }

        fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<Signal> {
            if ctx.position.is_none() {
                vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::EnterLong,
                    dec!(1),
                    bar.close,
                    self.name(),
                )]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn open_position_is_force_closed_on_stream_exhaustion() {
        let config = BacktestConfig::test_defaults("AAPL");
        let mut engine = BarEngine::new(config, Box::new(AlwaysLong));
        let report = engine.run(&bars()).unwrap();

        assert_eq!(report.trades.len(), 1);
        assert!(report.trades[0].forced);
        assert!(report.trades[0].holding_days >= 1);
    }

    #[test]
    fn non_monotonic_timestamps_are_rejected() {
        let config = BacktestConfig::test_defaults("AAPL");
        let mut engine = BarEngine::new(config, Box::new(AlwaysLong));
        let mut out_of_order = bars();
        out_of_order.swap(3, 4);
        assert!(engine.run(&out_of_order).is_err());
    }

    #[test]
    fn empty_bar_stream_errors() {
        let config = BacktestConfig::test_defaults("AAPL");
        let mut engine = BarEngine::new(config, Box::new(AlwaysLong));
        assert!(matches!(engine.run(&[]), Err(BacktestError::EmptyBarStream)));
    }
}
