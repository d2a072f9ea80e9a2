use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Market, OrderSide, OrderStatus, OrderType, TradingMode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderValidationError {
    MissingPrice,
    MissingStopPrice,
    NonPositiveQuantity,
}

impl std::fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderValidationError::MissingPrice => {
                write!(f, "order.price is required for LIMIT and STOP_LIMIT orders")
            }
            OrderValidationError::MissingStopPrice => {
                write!(f, "order.stop_price is required for STOP and STOP_LIMIT orders")
            }
            OrderValidationError::NonPositiveQuantity => write!(f, "order.quantity must be > 0"),
        }
    }
}

impl std::error::Error for OrderValidationError {}

/// A single order in its full lifecycle. Status is monotonic once terminal —
/// see [`OrderStatus::is_terminal`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub market: Market,
    pub mode: TradingMode,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub strategy_name: String,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: Market,
        mode: TradingMode,
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
        created_at: DateTime<Utc>,
        strategy_name: impl Into<String>,
    ) -> Result<Self, OrderValidationError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderValidationError::NonPositiveQuantity);
        }
        if order_type.requires_price() && price.is_none_or_non_positive() {
            return Err(OrderValidationError::MissingPrice);
        }
        if order_type.requires_stop_price() && stop_price.is_none_or_non_positive() {
            return Err(OrderValidationError::MissingStopPrice);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            market,
            mode,
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price,
            stop_price,
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
            created_at,
            updated_at: created_at,
            strategy_name: strategy_name.into(),
        })
    }

    pub fn remaining(&self) -> Decimal {
        (self.quantity - self.filled_quantity).max(Decimal::ZERO)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a (possibly partial) fill. Transitions `Partial` -> `Filled` once
    /// `filled_quantity` reaches `quantity`. Caller owns the clock.
    pub fn apply_fill_quantity(&mut self, qty: Decimal, at: DateTime<Utc>) {
        debug_assert!(!self.is_terminal(), "cannot fill a terminal order");
        self.filled_quantity = (self.filled_quantity + qty).min(self.quantity);
        self.status = if self.filled_quantity >= self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = at;
    }
}

trait OptionDecimalExt {
    fn is_none_or_non_positive(&self) -> bool;
}

impl OptionDecimalExt for Option<Decimal> {
    fn is_none_or_non_positive(&self) -> bool {
        match self {
            None => true,
            Some(v) => *v <= Decimal::ZERO,
        }
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
    fn market_order_requires_no_price() {
        let o = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            OrderType::Market,
            dec!(10),
            None,
            None,
            ts(),
            "turtle_breakout",
        );
        assert!(o.is_ok());
    }

    #[test]
    fn limit_order_without_price_rejected() {
        let o = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            OrderType::Limit,
            dec!(10),
            None,
            None,
            ts(),
            "turtle_breakout",
        );
        assert_eq!(o.unwrap_err(), OrderValidationError::MissingPrice);
    }

    #[test]
    fn stop_limit_requires_both_prices() {
        let o = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Sell,
            OrderType::StopLimit,
            dec!(10),
            Some(dec!(100)),
            None,
            ts(),
            "turtle_breakout",
        );
        assert_eq!(o.unwrap_err(), OrderValidationError::MissingStopPrice);
    }

    #[test]
    fn partial_then_full_fill_transitions_status() {
        let mut o = Order::new(
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            OrderType::Market,
            dec!(10),
            None,
            None,
            ts(),
            "turtle_breakout",
        )
        .unwrap();
        o.apply_fill_quantity(dec!(4), ts());
        assert_eq!(o.status, OrderStatus::Partial);
        assert_eq!(o.remaining(), dec!(6));
        o.apply_fill_quantity(dec!(6), ts());
        assert_eq!(o.status, OrderStatus::Filled);
        assert_eq!(o.remaining(), Decimal::ZERO);
    }
}
