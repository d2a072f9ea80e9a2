//! Maintains a `symbol -> Position` map, applying fills per the
//! same-side-grows / opposite-side-reduces-or-flips rule.
//!
//! Late-arriving fills for a symbol whose position was just closed are
//! treated as opening a brand new position rather than being rejected — see
//! the runtime's handling of out-of-order fill delivery.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use qtr_domain::{Fill, Market, OrderSide, Position, PositionSide};

#[derive(Default)]
pub struct PositionTracker {
    positions: BTreeMap<String, Position>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    /// Refresh `current_price` for `symbol` and recompute unrealised P&L.
    /// No-op if no position is open for that symbol.
    pub fn update_price(&mut self, symbol: &str, price: Decimal, at: DateTime<Utc>) {
        if let Some(pos) = self.positions.get_mut(symbol) {
            pos.mark(price, at);
        }
    }

    /// Apply a fill to the tracked position for `fill.symbol`, opening,
    /// growing, shrinking, or flipping it as required. Returns the realized
    /// P&L delta from this fill (zero if the fill only grows the position).
    pub fn apply_fill(&mut self, market: Market, fill: &Fill) -> Decimal {
        let fill_side = match fill.side {
            OrderSide::Buy => PositionSide::Long,
            OrderSide::Sell => PositionSide::Short,
        };

        match self.positions.get_mut(&fill.symbol) {
            None => {
                self.positions.insert(
                    fill.symbol.clone(),
                    Position::open(
                        market,
                        fill.symbol.clone(),
                        fill_side,
                        fill.quantity,
                        fill.price,
                        fill.timestamp,
                    ),
                );
                Decimal::ZERO
            }
            Some(pos) => {
                if pos.side == fill_side {
                    pos.add(fill.quantity, fill.price, fill.timestamp);
                    Decimal::ZERO
                } else {
                    let open_qty = pos.quantity;
                    let realized = pos.reduce(fill.quantity, fill.price, fill.timestamp);
                    if fill.quantity > open_qty {
                        let flip_qty = fill.quantity - open_qty;
                        self.positions.insert(
                            fill.symbol.clone(),
                            Position::open(
                                market,
                                fill.symbol.clone(),
                                fill_side,
                                flip_qty,
                                fill.price,
                                fill.timestamp,
                            ),
                        );
                    } else if !pos.is_open() {
                        self.positions.remove(&fill.symbol);
                    }
                    realized
                }
            }
        }
    }
}
