//! Legacy single-class strategy loader. Reserved for first-party strategies
//! only — the sandbox rules in [`crate::sandbox`] do not apply here, since
//! these are trusted, compiled-in strategies rather than arbitrary
//! third-party plugin sources.

use qtr_domain::{Bar, Signal};

use crate::types::{Strategy, StrategyContext};

/// What a legacy strategy may have declared itself as. Mirrors the original
/// loader's `TEAM_TYPE`, defaulted when the strategy does not set one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TeamType {
    Trading,
    Portfolio,
    Arbitrage,
}

impl Default for TeamType {
    fn default() -> Self {
        TeamType::Trading
    }
}

/// A legacy strategy's raw output before normalization: either a plain list
/// of signals, or nothing at all for a quiet bar.
pub enum LegacyResult {
    Signals(Vec<Signal>),
    None,
}

/// The legacy contract: a `name`, an optional declared team type, and
/// `on_candle`. `initialize`/`reset` have default no-op bodies so a minimal
/// legacy strategy need only implement `on_candle`.
pub trait LegacyStrategy: Send {
    fn name(&self) -> &str;

    fn team_type(&self) -> TeamType {
        TeamType::default()
    }

    fn initialize(&mut self) {}

    fn reset(&mut self) {}

    fn on_candle(&mut self, bar: &Bar, ctx: &StrategyContext) -> LegacyResult;
}

/// Adapts a [`LegacyStrategy`] to the unified [`Strategy`] trait the bar
/// engine drives, normalizing `LegacyResult::None` to an empty signal list.
pub struct LegacyStrategyWrapper<S: LegacyStrategy> {
    inner: S,
}

impl<S: LegacyStrategy> LegacyStrategyWrapper<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn team_type(&self) -> TeamType {
        self.inner.team_type()
    }
}

impl<S: LegacyStrategy> Strategy for LegacyStrategyWrapper<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&mut self) {
        self.inner.initialize();
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<Signal> {
        match self.inner.on_candle(bar, ctx) {
            LegacyResult::Signals(signals) => signals,
            LegacyResult::None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qtr_domain::{Market, SignalAction, TradingMode};
    use rust_decimal_macros::dec;

    struct AlwaysEnterLong {
        emitted: bool,
    }

    impl LegacyStrategy for AlwaysEnterLong {
        fn name(&self) -> &str {
            "always_enter_long"
        }

        fn reset(&mut self) {
            self.emitted = false;
        }

        fn on_candle(&mut self, bar: &Bar, ctx: &StrategyContext) -> LegacyResult {
            if self.emitted {
                return LegacyResult::None;
            }
            self.emitted = true;
            LegacyResult::Signals(vec![Signal::new(
                ctx.market,
                ctx.mode,
                ctx.symbol.clone(),
                bar.timestamp,
                SignalAction::EnterLong,
                dec!(1),
                bar.close,
                self.name(),
            )])
        }
    }

    fn bar() -> Bar {
        Bar::new(
            Market::Us,
            "AAPL",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            dec!(100),
            dec!(105),
            dec!(99),
            dec!(102),
            dec!(1000),
            "1d",
        )
        .unwrap()
    }

    fn ctx() -> StrategyContext {
        StrategyContext::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            dec!(102),
            None,
            crate::types::RecentBarsWindow::new(10),
        )
    }

    #[test]
    fn none_result_normalizes_to_empty_vec() {
        let mut wrapper = LegacyStrategyWrapper::new(AlwaysEnterLong { emitted: true });
        let signals = wrapper.on_bar(&bar(), &ctx());
        assert!(signals.is_empty());
    }

    #[test]
    fn signals_pass_through_unwrapped() {
        let mut wrapper = LegacyStrategyWrapper::new(AlwaysEnterLong { emitted: false });
        let signals = wrapper.on_bar(&bar(), &ctx());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].action, SignalAction::EnterLong);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut wrapper = LegacyStrategyWrapper::new(AlwaysEnterLong { emitted: false });
        wrapper.on_bar(&bar(), &ctx());
        assert!(wrapper.on_bar(&bar(), &ctx()).is_empty());
        wrapper.reset();
        assert_eq!(wrapper.on_bar(&bar(), &ctx()).len(), 1);
    }
}
