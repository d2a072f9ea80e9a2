//! Tracks initial/peak/daily-start/current equity and raises [`RiskAlert`]s
//! when drawdown or daily loss breach configured thresholds. Does not itself
//! own the kill switch — the caller wires [`RiskManager::update_equity`]'s
//! alerts into a [`crate::KillSwitch`].

use rust_decimal::Decimal;

use crate::types::{RiskAlert, RiskConfig};

#[derive(Clone, Debug, PartialEq)]
pub struct RiskManager {
    config: RiskConfig,
    initial_equity: Decimal,
    peak_equity: Decimal,
    daily_start_equity: Decimal,
    current_equity: Decimal,
}

impl RiskManager {
    pub fn new(config: RiskConfig, initial_equity: Decimal) -> Self {
        Self {
            config,
            initial_equity,
            peak_equity: initial_equity,
            daily_start_equity: initial_equity,
            current_equity: initial_equity,
        }
    }

    pub fn current_equity(&self) -> Decimal {
        self.current_equity
    }

    pub fn peak_equity(&self) -> Decimal {
        self.peak_equity
    }

    pub fn drawdown_pct(&self) -> Decimal {
        if self.peak_equity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.peak_equity - self.current_equity) / self.peak_equity * Decimal::new(100, 0)
    }

    pub fn daily_loss_pct(&self) -> Decimal {
        if self.daily_start_equity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.daily_start_equity - self.current_equity) / self.daily_start_equity * Decimal::new(100, 0)
    }

    /// Update current equity, advance peak equity monotonically, and return
    /// every alert this update breached. Order is significant: drawdown is
    /// always checked before daily loss.
    pub fn update_equity(&mut self, equity: Decimal) -> Vec<RiskAlert> {
        self.current_equity = equity;
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }

        let mut alerts = Vec::new();

        let drawdown_pct = self.drawdown_pct();
        if drawdown_pct >= self.config.max_drawdown_pct {
            alerts.push(RiskAlert::DrawdownBreach {
                drawdown_pct,
                threshold_pct: self.config.max_drawdown_pct,
            });
        }

        let daily_loss_pct = self.daily_loss_pct();
        if daily_loss_pct >= self.config.daily_loss_limit_pct {
            alerts.push(RiskAlert::DailyLossBreach {
                daily_loss_pct,
                threshold_pct: self.config.daily_loss_limit_pct,
            });
        }

        alerts
    }

    /// Snapshot `daily_start <- current`. Externally invoked at session start
    /// (or day rollover) — never called automatically by this type.
    pub fn reset_daily(&mut self) {
        self.daily_start_equity = self.current_equity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn drawdown_breach_emits_alert_at_threshold() {
        let mut rm = RiskManager::new(
            RiskConfig {
                max_drawdown_pct: dec!(20),
                daily_loss_limit_pct: dec!(100),
            },
            dec!(10000),
        );
        let alerts = rm.update_equity(dec!(8000));
        assert!(alerts
            .iter()
            .any(|a| matches!(a, RiskAlert::DrawdownBreach { .. })));
    }

    #[test]
    fn no_breach_below_threshold() {
        let mut rm = RiskManager::new(
            RiskConfig {
                max_drawdown_pct: dec!(20),
                daily_loss_limit_pct: dec!(100),
            },
            dec!(10000),
        );
        let alerts = rm.update_equity(dec!(9000));
        assert!(alerts.is_empty());
    }

    #[test]
    fn peak_equity_is_monotonic() {
        let mut rm = RiskManager::new(
            RiskConfig {
                max_drawdown_pct: dec!(50),
                daily_loss_limit_pct: dec!(100),
            },
            dec!(10000),
        );
        rm.update_equity(dec!(12000));
        rm.update_equity(dec!(11000));
        assert_eq!(rm.peak_equity(), dec!(12000));
    }

    #[test]
    fn daily_loss_breach_resets_after_reset_daily() {
        let mut rm = RiskManager::new(
            RiskConfig {
                max_drawdown_pct: dec!(100),
                daily_loss_limit_pct: dec!(10),
            },
            dec!(10000),
        );
        let alerts = rm.update_equity(dec!(8900));
        assert!(alerts
            .iter()
            .any(|a| matches!(a, RiskAlert::DailyLossBreach { .. })));
        rm.reset_daily();
        let alerts = rm.update_equity(dec!(8900));
        assert!(alerts.is_empty());
    }
}
