//! Translates a strategy [`Signal`] into an [`Order`]. Sizing follows the
//! spec's formula exactly: `quantity = (balance * position_size_pct) /
//! price_at_signal` for entries; exits close the full tracked position.
//! Building an order here never submits it — that's the runtime loop's job,
//! via the broker port, so this stays pure and independently testable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Market, Order, OrderSide, OrderType, OrderValidationError, Position, PositionSide, Signal, SignalAction, TradingMode};

pub struct OrderManager {
    pub market: Market,
    pub mode: TradingMode,
    pub position_size_pct: Decimal,
}

impl OrderManager {
    pub fn new(market: Market, mode: TradingMode, position_size_pct: Decimal) -> Self {
        Self {
            market,
            mode,
            position_size_pct,
        }
    }

    /// Resolve `signal` against `position` (the tracker's current view for
    /// that symbol) into an order, or `None` if the signal doesn't apply —
    /// e.g. an `EXIT_LONG` with no open long position. Mirrors the bar
    /// engine's signal-resolution rules so live and backtest never diverge
    /// on what counts as an actionable signal.
    pub fn build_order(
        &self,
        signal: &Signal,
        balance: Decimal,
        position: Option<&Position>,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderValidationError> {
        let order = match signal.action {
            SignalAction::EnterLong => {
                if position.map_or(false, |p| p.is_open()) {
                    return Ok(None);
                }
                self.sized_entry(OrderSide::Buy, signal, balance, now)?
            }
            SignalAction::EnterShort => {
                if position.map_or(false, |p| p.is_open()) {
                    return Ok(None);
                }
                self.sized_entry(OrderSide::Sell, signal, balance, now)?
            }
            SignalAction::ExitLong => match position.filter(|p| p.is_open() && p.side == PositionSide::Long) {
                Some(pos) => self.full_exit(OrderSide::Sell, signal, pos, now)?,
                None => return Ok(None),
            },
            SignalAction::ExitShort => match position.filter(|p| p.is_open() && p.side == PositionSide::Short) {
                Some(pos) => self.full_exit(OrderSide::Buy, signal, pos, now)?,
                None => return Ok(None),
            },
        };
        Ok(Some(order))
    }

    fn sized_entry(
        &self,
        side: OrderSide,
        signal: &Signal,
        balance: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderValidationError> {
        let quantity = if signal.price_at_signal > Decimal::ZERO {
            (balance * self.position_size_pct) / signal.price_at_signal
        } else {
            Decimal::ZERO
        };
        Order::new(
            self.market,
            self.mode,
            signal.symbol.clone(),
            side,
            OrderType::Market,
            quantity,
            None,
            None,
            now,
            signal.strategy_name.clone(),
        )
    }

    fn full_exit(
        &self,
        side: OrderSide,
        signal: &Signal,
        position: &Position,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderValidationError> {
        Order::new(
            self.market,
            self.mode,
            signal.symbol.clone(),
            side,
            OrderType::Market,
            position.quantity,
            None,
            None,
            now,
            signal.strategy_name.clone(),
        )
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

    fn signal(action: SignalAction) -> Signal {
        Signal::new(Market::Us, TradingMode::Paper, "AAPL", ts(), action, dec!(1), dec!(100), "turtle_breakout")
    }

    #[test]
    fn enter_long_sizes_by_balance_and_price() {
        let om = OrderManager::new(Market::Us, TradingMode::Paper, dec!(0.1));
        let order = om
            .build_order(&signal(SignalAction::EnterLong), dec!(100_000), None, ts())
            .unwrap()
            .unwrap();
        assert_eq!(order.quantity, dec!(100));
        assert_eq!(order.side, OrderSide::Buy);
    }

    #[test]
    fn enter_long_with_existing_open_position_is_ignored() {
        let om = OrderManager::new(Market::Us, TradingMode::Paper, dec!(0.1));
        let pos = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(10), dec!(100), ts());
        let result = om
            .build_order(&signal(SignalAction::EnterLong), dec!(100_000), Some(&pos), ts())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn exit_long_without_position_is_ignored() {
        let om = OrderManager::new(Market::Us, TradingMode::Paper, dec!(0.1));
        let result = om
            .build_order(&signal(SignalAction::ExitLong), dec!(100_000), None, ts())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn exit_long_closes_full_tracked_quantity() {
        let om = OrderManager::new(Market::Us, TradingMode::Paper, dec!(0.1));
        let pos = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(7), dec!(100), ts());
        let order = om
            .build_order(&signal(SignalAction::ExitLong), dec!(100_000), Some(&pos), ts())
            .unwrap()
            .unwrap();
        assert_eq!(order.quantity, dec!(7));
        assert_eq!(order.side, OrderSide::Sell);
    }
}
