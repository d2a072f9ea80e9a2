use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Market, PositionSide};

/// Open (or just-closed) exposure in a single symbol, tracked by weighted
/// average entry price. `closed_at` is `None` while the position is open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub market: Market,
    pub symbol: String,
    pub side: PositionSide,
    pub quantity: Decimal,
    pub avg_entry_price: Decimal,
    pub current_price: Decimal,
    pub realized_pnl: Decimal,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Position {
    pub fn open(
        market: Market,
        symbol: impl Into<String>,
        side: PositionSide,
        quantity: Decimal,
        entry_price: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(quantity > Decimal::ZERO, "Position.quantity must be > 0");
        Self {
            market,
            symbol: symbol.into(),
            side,
            quantity,
            avg_entry_price: entry_price,
            current_price: entry_price,
            realized_pnl: Decimal::ZERO,
            opened_at,
            updated_at: opened_at,
            closed_at: None,
        }
    }

    pub fn notional(&self) -> Decimal {
        self.quantity * self.current_price
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none() && self.quantity > Decimal::ZERO
    }

    /// Unrealized P&L given the current marked price, signed by position side.
    pub fn unrealized_pnl(&self) -> Decimal {
        let sign = Decimal::from(self.side.sign());
        sign * self.quantity * (self.current_price - self.avg_entry_price)
    }

    pub fn mark(&mut self, price: Decimal, at: DateTime<Utc>) {
        self.current_price = price;
        self.updated_at = at;
    }

    /// Add to the position, folding the new lot into the weighted average entry.
    pub fn add(&mut self, quantity: Decimal, price: Decimal, at: DateTime<Utc>) {
        debug_assert!(quantity > Decimal::ZERO);
        let total_qty = self.quantity + quantity;
        self.avg_entry_price =
            (self.avg_entry_price * self.quantity + price * quantity) / total_qty;
        self.quantity = total_qty;
        self.current_price = price;
        self.updated_at = at;
    }

    /// Reduce the position by `quantity` at `price`, realizing P&L on the
    /// portion closed. Returns the realized P&L delta from this reduction.
    /// Caller is responsible for closing the position once `quantity` hits zero.
    pub fn reduce(&mut self, quantity: Decimal, price: Decimal, at: DateTime<Utc>) -> Decimal {
        debug_assert!(quantity > Decimal::ZERO);
        let closed_qty = quantity.min(self.quantity);
        let sign = Decimal::from(self.side.sign());
        let realized_delta = sign * closed_qty * (price - self.avg_entry_price);
        self.realized_pnl += realized_delta;
        self.quantity -= closed_qty;
        self.current_price = price;
        self.updated_at = at;
        if self.quantity <= Decimal::ZERO {
            self.quantity = Decimal::ZERO;
            self.closed_at = Some(at);
        }
        realized_delta
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
    fn long_unrealized_pnl_positive_when_price_rises() {
        let mut p = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(10), dec!(100), ts());
        p.mark(dec!(110), ts());
        assert_eq!(p.unrealized_pnl(), dec!(100));
    }

    #[test]
    fn short_unrealized_pnl_positive_when_price_falls() {
        let mut p = Position::open(Market::Us, "AAPL", PositionSide::Short, dec!(10), dec!(100), ts());
        p.mark(dec!(90), ts());
        assert_eq!(p.unrealized_pnl(), dec!(100));
    }

    #[test]
    fn add_updates_weighted_average_entry() {
        let mut p = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(10), dec!(100), ts());
        p.add(dec!(10), dec!(120), ts());
        assert_eq!(p.avg_entry_price, dec!(110));
        assert_eq!(p.quantity, dec!(20));
    }

    #[test]
    fn full_reduce_closes_position() {
        let mut p = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(10), dec!(100), ts());
        let realized = p.reduce(dec!(10), dec!(115), ts());
        assert_eq!(realized, dec!(150));
        assert!(!p.is_open());
        assert_eq!(p.quantity, Decimal::ZERO);
    }

    #[test]
    fn partial_reduce_keeps_position_open() {
        let mut p = Position::open(Market::Us, "AAPL", PositionSide::Long, dec!(10), dec!(100), ts());
        p.reduce(dec!(4), dec!(110), ts());
        assert!(p.is_open());
        assert_eq!(p.quantity, dec!(6));
    }
}
