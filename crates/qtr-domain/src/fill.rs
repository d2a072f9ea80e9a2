use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Market, OrderSide, TradingMode};

/// A simulated or broker-reported execution. `latency_ms` is always >= 1 —
/// the fill simulator never reports instantaneous (same-tick) fills, by design,
/// so strategies can't accidentally depend on zero-latency execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub order_id: Uuid,
    pub market: Market,
    pub mode: TradingMode,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    pub slippage_bps: Decimal,
    pub latency_ms: u32,
    pub metadata: std::collections::BTreeMap<String, String>,
}

impl Fill {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: Uuid,
        market: Market,
        mode: TradingMode,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        commission: Decimal,
        commission_asset: impl Into<String>,
        slippage_bps: Decimal,
        latency_ms: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            order_id,
            market,
            mode,
            symbol: symbol.into(),
            side,
            quantity,
            price,
            commission,
            commission_asset: commission_asset.into(),
            slippage_bps,
            latency_ms: latency_ms.max(1),
            metadata: std::collections::BTreeMap::new(),
        }
    }

    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }

    /// Signed cash delta a position tracker should apply: negative for a buy
    /// (cash out), positive for a sell (cash in), before commission.
    pub fn signed_notional(&self) -> Decimal {
        match self.side {
            OrderSide::Buy => -self.notional(),
            OrderSide::Sell => self.notional(),
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
    fn latency_floor_is_one_ms() {
        let f = Fill::new(
            Uuid::new_v4(),
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            dec!(10),
            dec!(100),
            dec!(1),
            "USD",
            dec!(3),
            0,
            ts(),
        );
        assert_eq!(f.latency_ms, 1);
    }

    #[test]
    fn signed_notional_sign_by_side() {
        let buy = Fill::new(
            Uuid::new_v4(),
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Buy,
            dec!(10),
            dec!(100),
            dec!(1),
            "USD",
            dec!(3),
            5,
            ts(),
        );
        assert_eq!(buy.signed_notional(), dec!(-1000));

        let sell = Fill::new(
            Uuid::new_v4(),
            Market::Us,
            TradingMode::Backtest,
            "AAPL",
            OrderSide::Sell,
            dec!(10),
            dec!(100),
            dec!(1),
            "USD",
            dec!(3),
            5,
            ts(),
        );
        assert_eq!(sell.signed_notional(), dec!(1000));
    }
}
