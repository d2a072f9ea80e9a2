use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Market, SignalAction, TradingMode};

/// A strategy's output for a single bar close. Carries no order-sizing
/// information — that is the runtime's job, driven by `PolicySet`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub market: Market,
    pub mode: TradingMode,
    pub symbol: String,
    pub action: SignalAction,
    /// Conviction in [0, 1]. Clamped by `new`, never rejected.
    pub strength: Decimal,
    pub price_at_signal: Decimal,
    pub strategy_name: String,
    pub metadata: std::collections::BTreeMap<String, String>,
}

impl Signal {
    pub fn new(
        market: Market,
        mode: TradingMode,
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        action: SignalAction,
        strength: Decimal,
        price_at_signal: Decimal,
        strategy_name: impl Into<String>,
    ) -> Self {
        let strength = strength.clamp(Decimal::ZERO, Decimal::ONE);
        Self {
            id: Uuid::new_v4(),
            timestamp,
            market,
            mode,
            symbol: symbol.into(),
            action,
            strength,
            price_at_signal,
            strategy_name: strategy_name.into(),
            metadata: std::collections::BTreeMap::new(),
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(
            self.action,
            SignalAction::EnterLong | SignalAction::EnterShort
        )
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.action, SignalAction::ExitLong | SignalAction::ExitShort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn strength_clamps_above_one() {
        let s = Signal::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            ts(),
            SignalAction::EnterLong,
            dec!(1.5),
            dec!(100),
            "turtle_breakout",
        );
        assert_eq!(s.strength, Decimal::ONE);
    }

    #[test]
    fn strength_clamps_below_zero() {
        let s = Signal::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            ts(),
            SignalAction::ExitLong,
            dec!(-0.2),
            dec!(100),
            "turtle_breakout",
        );
        assert_eq!(s.strength, Decimal::ZERO);
        assert!(s.is_exit());
        assert!(!s.is_entry());
    }
}
