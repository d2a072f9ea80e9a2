use qtr_domain::{Bar, Signal};

use crate::types::{Strategy, StrategyContext, StrategyLifecycle};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StrategyHostError {
    NoStrategyRegistered,
    NotInitialised,
}

impl std::fmt::Display for StrategyHostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyHostError::NoStrategyRegistered => write!(f, "no strategy registered"),
            StrategyHostError::NotInitialised => {
                write!(f, "strategy must be initialised before it can run")
            }
        }
    }
}

impl std::error::Error for StrategyHostError {}

/// Owns one strategy instance and walks it through
/// `Uninitialised -> Initialised -> Running -> Reset`. The backtest engine
/// and walk-forward validator both drive strategies through this host so
/// lifecycle transitions happen in exactly one place.
pub struct StrategyHost {
    strategy: Option<Box<dyn Strategy>>,
    lifecycle: StrategyLifecycle,
}

impl StrategyHost {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy: Some(strategy),
            lifecycle: StrategyLifecycle::Uninitialised,
        }
    }

    pub fn lifecycle(&self) -> StrategyLifecycle {
        self.lifecycle
    }

    pub fn initialize(&mut self) -> Result<(), StrategyHostError> {
        let s = self
            .strategy
            .as_mut()
            .ok_or(StrategyHostError::NoStrategyRegistered)?;
        s.initialize();
        self.lifecycle = StrategyLifecycle::Initialised;
        Ok(())
    }

    pub fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Result<Vec<Signal>, StrategyHostError> {
        if self.lifecycle == StrategyLifecycle::Uninitialised {
            return Err(StrategyHostError::NotInitialised);
        }
        let s = self
            .strategy
            .as_mut()
            .ok_or(StrategyHostError::NoStrategyRegistered)?;
        self.lifecycle = StrategyLifecycle::Running;
        Ok(s.on_bar(bar, ctx))
    }

    pub fn on_fill(&mut self, fill: &qtr_domain::Fill) -> Result<(), StrategyHostError> {
        let s = self
            .strategy
            .as_mut()
            .ok_or(StrategyHostError::NoStrategyRegistered)?;
        s.on_fill(fill);
        Ok(())
    }

    /// Restore the strategy to its freshly-initialised state. Required
    /// before reusing the same instance across a walk-forward window.
    pub fn reset(&mut self) -> Result<(), StrategyHostError> {
        let s = self
            .strategy
            .as_mut()
            .ok_or(StrategyHostError::NoStrategyRegistered)?;
        s.reset();
        self.lifecycle = StrategyLifecycle::Initialised;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), StrategyHostError> {
        let s = self
            .strategy
            .as_mut()
            .ok_or(StrategyHostError::NoStrategyRegistered)?;
        s.finalize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecentBarsWindow;
    use chrono::{TimeZone, Utc};
    use qtr_domain::{Market, TradingMode};
    use rust_decimal_macros::dec;

    struct CountingStrategy {
        calls: u32,
    }

    impl Strategy for CountingStrategy {
        fn name(&self) -> &str {
            "counting"
        }

        fn reset(&mut self) {
            self.calls = 0;
        }

        fn on_bar(&mut self, _bar: &Bar, _ctx: &StrategyContext) -> Vec<Signal> {
            self.calls += 1;
            Vec::new()
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
            RecentBarsWindow::new(10),
        )
    }

    #[test]
    fn on_bar_before_initialize_errors() {
        let mut host = StrategyHost::new(Box::new(CountingStrategy { calls: 0 }));
        assert!(host.on_bar(&bar(), &ctx()).is_err());
    }

    #[test]
    fn lifecycle_progresses_through_running() {
        let mut host = StrategyHost::new(Box::new(CountingStrategy { calls: 0 }));
        host.initialize().unwrap();
        assert_eq!(host.lifecycle(), StrategyLifecycle::Initialised);
        host.on_bar(&bar(), &ctx()).unwrap();
        assert_eq!(host.lifecycle(), StrategyLifecycle::Running);
    }

    #[test]
    fn reset_returns_to_initialised() {
        let mut host = StrategyHost::new(Box::new(CountingStrategy { calls: 0 }));
        host.initialize().unwrap();
        host.on_bar(&bar(), &ctx()).unwrap();
        host.reset().unwrap();
        assert_eq!(host.lifecycle(), StrategyLifecycle::Initialised);
    }
}
