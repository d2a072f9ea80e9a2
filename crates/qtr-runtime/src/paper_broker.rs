//! Paper-trading [`Broker`]. Fills are simulated by [`FillSimulator`] — the
//! same engine the backtest uses — so paper and backtest runs never diverge
//! on cost modeling, only on what feeds them bars.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use qtr_domain::{Fill, Market, Order, OrderStatus};
use qtr_fillsim::{FillSimConfig, FillSimulator};

use crate::ports::{Broker, OrderError};

pub struct PaperBroker {
    market: Market,
    fillsim: FillSimulator,
    balance: Decimal,
    last_price: BTreeMap<String, Decimal>,
    open_orders: BTreeMap<Uuid, Order>,
    order_log: BTreeMap<Uuid, Order>,
    pending_fills: Vec<Fill>,
    pending_order_updates: Vec<Order>,
}

impl PaperBroker {
    pub fn new(market: Market, seed: u64, starting_balance: Decimal) -> Self {
        Self {
            market,
            fillsim: FillSimulator::new(FillSimConfig::new(seed)),
            balance: starting_balance,
            last_price: BTreeMap::new(),
            open_orders: BTreeMap::new(),
            order_log: BTreeMap::new(),
            pending_fills: Vec::new(),
            pending_order_updates: Vec::new(),
        }
    }
}

impl Broker for PaperBroker {
    fn connect(&mut self) -> Result<(), OrderError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), OrderError> {
        Ok(())
    }

    fn submit_order(&mut self, mut order: Order) -> Result<Order, OrderError> {
        let reference_price = match order.price {
            Some(p) => p,
            None => *self
                .last_price
                .get(&order.symbol)
                .ok_or_else(|| OrderError::SubmitFailed(format!("no reference price for {}", order.symbol)))?,
        };

        order.status = OrderStatus::Submitted;

        let fill = self
            .fillsim
            .simulate_fill(&order, reference_price, order.created_at)
            .map_err(|e| OrderError::SubmitFailed(e.to_string()))?;

        order.apply_fill_quantity(fill.quantity, fill.timestamp);
        self.balance += fill.signed_notional() - fill.commission;

        self.order_log.insert(order.id, order.clone());
        if order.is_terminal() {
            self.open_orders.remove(&order.id);
        } else {
            self.open_orders.insert(order.id, order.clone());
        }

        self.pending_order_updates.push(order.clone());
        self.pending_fills.push(fill);

        Ok(order)
    }

    fn cancel_order(&mut self, order_id: Uuid) -> Result<(), OrderError> {
        match self.open_orders.remove(&order_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                self.order_log.insert(order.id, order.clone());
                self.pending_order_updates.push(order);
                Ok(())
            }
            None => Err(OrderError::CancelFailed(format!("unknown or terminal order {order_id}"))),
        }
    }

    fn get_order_status(&self, order_id: Uuid) -> Result<OrderStatus, OrderError> {
        self.order_log
            .get(&order_id)
            .map(|o| o.status)
            .ok_or_else(|| OrderError::StatusUnavailable(order_id.to_string()))
    }

    fn get_open_orders(&self, symbol: Option<&str>) -> Vec<Order> {
        self.open_orders
            .values()
            .filter(|o| match symbol {
                Some(s) => o.symbol == s,
                None => true,
            })
            .cloned()
            .collect()
    }

    fn get_account_balance(&self) -> Decimal {
        self.balance
    }

    fn poll_fills(&mut self) -> Vec<Fill> {
        std::mem::take(&mut self.pending_fills)
    }

    fn poll_order_updates(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.pending_order_updates)
    }

    fn mark_price(&mut self, symbol: &str, price: Decimal, _at: DateTime<Utc>) {
        self.last_price.insert(symbol.to_string(), price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qtr_domain::{OrderSide, OrderType, TradingMode};
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn market_order_fills_against_marked_price() {
        let mut broker = PaperBroker::new(Market::Us, 7, dec!(100_000));
        broker.mark_price("AAPL", dec!(100), ts());
        let order = Order::new(
            Market::Us,
            TradingMode::Paper,
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
        let filled = broker.submit_order(order).unwrap();
        assert_eq!(filled.status, OrderStatus::Filled);
        assert_eq!(broker.poll_fills().len(), 1);
    }

    #[test]
    fn market_order_without_marked_price_is_rejected() {
        let mut broker = PaperBroker::new(Market::Us, 7, dec!(100_000));
        let order = Order::new(
            Market::Us,
            TradingMode::Paper,
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
        assert!(broker.submit_order(order).is_err());
    }

    #[test]
    fn buy_then_sell_moves_balance_and_drains_fills() {
        let mut broker = PaperBroker::new(Market::Us, 7, dec!(100_000));
        broker.mark_price("AAPL", dec!(100), ts());
        let buy = Order::new(
            Market::Us,
            TradingMode::Paper,
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
        broker.submit_order(buy).unwrap();
        let starting = broker.get_account_balance();
        assert!(starting < dec!(100_000));

        broker.mark_price("AAPL", dec!(110), ts());
        let sell = Order::new(
            Market::Us,
            TradingMode::Paper,
            "AAPL",
            OrderSide::Sell,
            OrderType::Market,
            dec!(10),
            None,
            None,
            ts(),
            "turtle_breakout",
        )
        .unwrap();
        broker.submit_order(sell).unwrap();
        assert!(broker.get_account_balance() > starting);
        assert_eq!(broker.poll_fills().len(), 2);
        assert!(broker.poll_fills().is_empty());
    }
}
