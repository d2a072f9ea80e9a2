//! The cooperative, single-threaded event loop that wires a [`DataFeed`] and
//! [`Broker`] to a strategy. Every bar is processed to completion — signal,
//! order, fill, risk check — before the next bar is pulled, so there is
//! never more than one symbol's pipeline in flight at a time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Bar, Market, Position, TradingMode};
use qtr_risk::{evaluate, KillSwitch, KillSwitchReason, PositionTracker, RequestKind, RiskAlert, RiskConfig, RiskManager};
use qtr_strategy::{RecentBarsWindow, Strategy, StrategyContext, StrategyHost, StrategyHostError};

use crate::event_sink::EventSink;
use crate::order_manager::OrderManager;
use crate::ports::{Broker, Clock, DataFeed, DataFeedError};

#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeError {
    DataFeed(DataFeedError),
    NonMonotonicTimestamp { symbol: String, at: DateTime<Utc> },
    StrategyHost(StrategyHostError),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::DataFeed(e) => write!(f, "data feed exhausted its retry budget: {e}"),
            RuntimeError::NonMonotonicTimestamp { symbol, at } => {
                write!(f, "bar for {symbol} at {at} did not advance the clock")
            }
            RuntimeError::StrategyHost(e) => write!(f, "strategy host error: {e}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<StrategyHostError> for RuntimeError {
    fn from(e: StrategyHostError) -> Self {
        RuntimeError::StrategyHost(e)
    }
}

pub struct RuntimeConfig {
    pub market: Market,
    pub mode: TradingMode,
    pub initial_capital: Decimal,
    pub position_size_pct: Decimal,
    pub bar_history_len: usize,
    pub risk: RiskConfig,
    pub max_feed_retries: u32,
}

/// Owns every moving part of a live or paper run. Generic over the three
/// ports plus the event sink so tests can swap in in-memory fakes without
/// touching the loop itself.
pub struct LiveRuntime<D: DataFeed, B: Broker, C: Clock, E: EventSink> {
    config: RuntimeConfig,
    feed: D,
    broker: B,
    clock: C,
    sink: E,
    host: StrategyHost,
    order_manager: OrderManager,
    tracker: PositionTracker,
    risk: RiskManager,
    kill_switch: KillSwitch,
    recent: BTreeMap<String, RecentBarsWindow>,
    last_timestamp: Option<DateTime<Utc>>,
    total_realized_pnl: Decimal,
    total_fees: Decimal,
}

impl<D: DataFeed, B: Broker, C: Clock, E: EventSink> LiveRuntime<D, B, C, E> {
    pub fn new(config: RuntimeConfig, strategy: Box<dyn Strategy>, feed: D, broker: B, clock: C, sink: E) -> Self {
        let risk = RiskManager::new(config.risk, config.initial_capital);
        let order_manager = OrderManager::new(config.market, config.mode, config.position_size_pct);
        Self {
            config,
            feed,
            broker,
            clock,
            sink,
            host: StrategyHost::new(strategy),
            order_manager,
            tracker: PositionTracker::new(),
            risk,
            kill_switch: KillSwitch::armed(""),
            recent: BTreeMap::new(),
            last_timestamp: None,
            total_realized_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
        }
    }

    pub fn current_equity(&self) -> Decimal {
        self.risk.current_equity()
    }

    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.host.initialize()?;
        let mut retries = 0u32;
        loop {
            match self.feed.next_bar() {
                None => break,
                Some(Err(e)) => {
                    retries += 1;
                    self.sink.emit_health(&format!("data feed error ({retries}): {e}"));
                    if retries > self.config.max_feed_retries {
                        return Err(RuntimeError::DataFeed(e));
                    }
                    continue;
                }
                Some(Ok(bar)) => {
                    retries = 0;
                    self.process_bar(bar)?;
                }
            }
        }
        self.host.finalize()?;
        Ok(())
    }

    fn process_bar(&mut self, bar: Bar) -> Result<(), RuntimeError> {
        if let Some(last) = self.last_timestamp {
            if bar.timestamp <= last {
                return Err(RuntimeError::NonMonotonicTimestamp {
                    symbol: bar.symbol.clone(),
                    at: bar.timestamp,
                });
            }
        }
        self.last_timestamp = Some(bar.timestamp);

        self.tracker.update_price(&bar.symbol, bar.close, bar.timestamp);
        self.broker.mark_price(&bar.symbol, bar.close, bar.timestamp);

        let window = self
            .recent
            .entry(bar.symbol.clone())
            .or_insert_with(|| RecentBarsWindow::new(self.config.bar_history_len));
        let position = self.tracker.get(&bar.symbol).cloned();
        let ctx = StrategyContext::new(
            self.config.market,
            self.config.mode,
            bar.symbol.clone(),
            bar.timestamp,
            bar.close,
            position,
            window.clone(),
        );

        let signals = self.host.on_bar(&bar, &ctx)?;
        window.push(bar);

        for signal in signals {
            self.handle_signal(&signal);
        }

        self.drain_fills();
        self.drain_order_updates();
        self.evaluate_risk();

        Ok(())
    }

    fn handle_signal(&mut self, signal: &qtr_domain::Signal) {
        self.sink.emit_signal(signal);

        let kind = if signal.is_exit() {
            RequestKind::Flatten
        } else {
            RequestKind::NewOrder
        };
        if evaluate(&self.kill_switch, kind) == qtr_risk::RiskVerdict::Reject {
            self.sink.emit_health(&format!("signal for {} rejected: kill switch triggered", signal.symbol));
            return;
        }

        let position = self.tracker.get(&signal.symbol).cloned();
        let balance = self.risk.current_equity();
        let now = self.clock.now();
        let order = match self.order_manager.build_order(signal, balance, position.as_ref(), now) {
            Ok(Some(order)) => order,
            Ok(None) => return,
            Err(e) => {
                self.sink.emit_health(&format!("order sizing rejected for {}: {e}", signal.symbol));
                return;
            }
        };

        self.sink.emit_order(&order);
        if let Err(e) = self.broker.submit_order(order) {
            self.sink.emit_health(&format!("order submit failed for {}: {e}", signal.symbol));
        }
    }

    fn drain_fills(&mut self) {
        for fill in self.broker.poll_fills() {
            self.total_fees += fill.commission;
            self.total_realized_pnl += self.tracker.apply_fill(self.config.market, &fill);
            self.sink.emit_fill(&fill);
            let _ = self.host.on_fill(&fill);
        }
    }

    fn drain_order_updates(&mut self) {
        for order in self.broker.poll_order_updates() {
            self.sink.emit_order(&order);
        }
    }

    fn unrealized_pnl(&self) -> Decimal {
        self.tracker.positions().map(Position::unrealized_pnl).sum()
    }

    fn evaluate_risk(&mut self) {
        let equity = self.config.initial_capital + self.total_realized_pnl - self.total_fees + self.unrealized_pnl();
        let alerts = self.risk.update_equity(equity);
        for alert in &alerts {
            self.sink.emit_risk_alert(alert);
            let reason = match alert {
                RiskAlert::DrawdownBreach { .. } => KillSwitchReason::DrawdownBreach,
                RiskAlert::DailyLossBreach { .. } => KillSwitchReason::DailyLossBreach,
            };
            if !self.kill_switch.is_triggered() {
                let now = self.clock.now();
                self.kill_switch.trigger(reason, "risk_manager", now);
                let event = match self.kill_switch.state() {
                    qtr_risk::KillSwitchState::Triggered(event) => event.clone(),
                    _ => unreachable!("trigger() just set Triggered state"),
                };
                self.sink.emit_kill_switch(&event);
                self.flatten_open_orders();
            }
        }
    }

    fn flatten_open_orders(&mut self) {
        for order in self.broker.get_open_orders(None) {
            if let Err(e) = self.broker.cancel_order(order.id) {
                self.sink.emit_health(&format!("failed to cancel order {} during flatten: {e}", order.id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qtr_domain::{Fill, Order, OrderSide, OrderType, Signal, SignalAction};
    use qtr_strategy::StrategyLifecycle;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::ports::OrderError;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn bar(day: u32, close: Decimal) -> Bar {
        Bar::new(Market::Us, "AAPL", ts(day), close, close, close, close, dec!(1000), "1d").unwrap()
    }

    struct EnterOnceStrategy {
        entered: bool,
    }

    impl Strategy for EnterOnceStrategy {
        fn name(&self) -> &str {
            "enter_once"
        }

        fn reset(&mut self) {
            self.entered = false;
        }

        fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<qtr_domain::Signal> {
            if !self.entered {
                self.entered = true;
                vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::EnterLong,
                    dec!(1),
                    bar.close,
                    "enter_once",
                )]
            } else {
                Vec::new()
            }
        }
    }

    struct FakeFeed {
        bars: Vec<Bar>,
        idx: usize,
    }

    impl DataFeed for FakeFeed {
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
            let bar = self.bars.get(self.idx).cloned()?;
            self.idx += 1;
            Some(Ok(bar))
        }
        fn get_historical(
            &self,
            _symbol: &str,
            _interval: &str,
            _start: DateTime<Utc>,
            _end: Option<DateTime<Utc>>,
            _limit: Option<usize>,
        ) -> Result<Vec<Bar>, DataFeedError> {
            Ok(self.bars.clone())
        }
    }

    struct FakeBroker {
        balance: Decimal,
        fills: Vec<Fill>,
    }

    impl Broker for FakeBroker {
        fn connect(&mut self) -> Result<(), OrderError> {
            Ok(())
        }
        fn disconnect(&mut self) -> Result<(), OrderError> {
            Ok(())
        }
        fn submit_order(&mut self, mut order: Order) -> Result<Order, OrderError> {
            order.status = qtr_domain::OrderStatus::Filled;
            order.filled_quantity = order.quantity;
            let fill = Fill::new(
                order.id,
                order.market,
                order.mode,
                order.symbol.clone(),
                order.side,
                order.quantity,
                order.price.unwrap_or(dec!(100)),
                dec!(0),
                "USD",
                dec!(0),
                1,
                order.created_at,
            );
            self.fills.push(fill);
            Ok(order)
        }
        fn cancel_order(&mut self, _order_id: Uuid) -> Result<(), OrderError> {
            Ok(())
        }
        fn get_order_status(&self, _order_id: Uuid) -> Result<qtr_domain::OrderStatus, OrderError> {
            Ok(qtr_domain::OrderStatus::Filled)
        }
        fn get_open_orders(&self, _symbol: Option<&str>) -> Vec<Order> {
            Vec::new()
        }
        fn get_account_balance(&self) -> Decimal {
            self.balance
        }
        fn poll_fills(&mut self) -> Vec<Fill> {
            std::mem::take(&mut self.fills)
        }
        fn poll_order_updates(&mut self) -> Vec<Order> {
            Vec::new()
        }
    }

    struct FakeClock;
    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            ts(1)
        }
    }

    #[test]
    fn runs_to_completion_over_a_fixed_bar_stream() {
        let feed = FakeFeed {
            bars: vec![bar(1, dec!(100)), bar(2, dec!(101)), bar(3, dec!(102))],
            idx: 0,
        };
        let broker = FakeBroker {
            balance: dec!(100_000),
            fills: Vec::new(),
        };
        let config = RuntimeConfig {
            market: Market::Us,
            mode: TradingMode::Paper,
            initial_capital: dec!(100_000),
            position_size_pct: dec!(0.1),
            bar_history_len: 20,
            risk: RiskConfig::sane_defaults(),
            max_feed_retries: 0,
        };
        let mut runtime = LiveRuntime::new(
            config,
            Box::new(EnterOnceStrategy { entered: false }),
            feed,
            broker,
            FakeClock,
            crate::event_sink::TracingEventSink,
        );
        runtime.run().unwrap();
        assert_eq!(runtime.host.lifecycle(), StrategyLifecycle::Running);
        assert!(runtime.tracker.get("AAPL").is_some());
    }

    #[test]
    fn non_monotonic_bar_is_fatal() {
        let feed = FakeFeed {
            bars: vec![bar(2, dec!(100)), bar(1, dec!(101))],
            idx: 0,
        };
        let broker = FakeBroker {
            balance: dec!(100_000),
            fills: Vec::new(),
        };
        let config = RuntimeConfig {
            market: Market::Us,
            mode: TradingMode::Paper,
            initial_capital: dec!(100_000),
            position_size_pct: dec!(0.1),
            bar_history_len: 20,
            risk: RiskConfig::sane_defaults(),
            max_feed_retries: 0,
        };
        let mut runtime = LiveRuntime::new(
            config,
            Box::new(EnterOnceStrategy { entered: false }),
            feed,
            broker,
            FakeClock,
            crate::event_sink::TracingEventSink,
        );
        assert!(runtime.run().is_err());
    }
}
