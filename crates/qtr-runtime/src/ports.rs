//! Ports a live or paper runtime wires up: a bar-streaming data feed, an
//! order-routing broker, and a clock. Each is a plain synchronous trait —
//! this runtime models suspension points as explicit poll calls rather than
//! `async fn`, since the only true I/O boundary here is the adapter's own
//! network call, not anything this crate schedules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use qtr_domain::{Bar, Fill, Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataFeedError {
    ConnectFailed(String),
    SubscribeFailed(String),
    StreamFailed(String),
}

impl std::fmt::Display for DataFeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFeedError::ConnectFailed(msg) => write!(f, "data feed connect failed: {msg}"),
            DataFeedError::SubscribeFailed(msg) => write!(f, "data feed subscribe failed: {msg}"),
            DataFeedError::StreamFailed(msg) => write!(f, "data feed stream failed: {msg}"),
        }
    }
}

impl std::error::Error for DataFeedError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderError {
    SubmitFailed(String),
    CancelFailed(String),
    StatusUnavailable(String),
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderError::SubmitFailed(msg) => write!(f, "order submit failed: {msg}"),
            OrderError::CancelFailed(msg) => write!(f, "order cancel failed: {msg}"),
            OrderError::StatusUnavailable(msg) => write!(f, "order status unavailable: {msg}"),
        }
    }
}

impl std::error::Error for OrderError {}

/// Bar source. `next_bar` is the synchronous analogue of "stream bars" —
/// the runtime loop polls it every tick; `None` means the stream is
/// exhausted (backtest-style replay), not necessarily disconnected.
pub trait DataFeed {
    fn connect(&mut self) -> Result<(), DataFeedError>;
    fn disconnect(&mut self) -> Result<(), DataFeedError>;
    fn subscribe_candles(&mut self, symbols: &[String], interval: &str) -> Result<(), DataFeedError>;
    fn unsubscribe(&mut self) -> Result<(), DataFeedError>;
    fn next_bar(&mut self) -> Option<Result<Bar, DataFeedError>>;
    fn get_historical(
        &self,
        symbol: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, DataFeedError>;
}

/// Order routing plus the two callback hooks as poll methods: `poll_fills`
/// and `poll_order_updates` are drained once per runtime loop tick rather
/// than pushed, since the loop has no background task to push into.
pub trait Broker {
    fn connect(&mut self) -> Result<(), OrderError>;
    fn disconnect(&mut self) -> Result<(), OrderError>;
    fn submit_order(&mut self, order: Order) -> Result<Order, OrderError>;
    fn cancel_order(&mut self, order_id: Uuid) -> Result<(), OrderError>;
    fn get_order_status(&self, order_id: Uuid) -> Result<OrderStatus, OrderError>;
    fn get_open_orders(&self, symbol: Option<&str>) -> Vec<Order>;
    fn get_account_balance(&self) -> Decimal;
    fn poll_fills(&mut self) -> Vec<Fill>;
    fn poll_order_updates(&mut self) -> Vec<Order>;

    /// Refresh the broker's notion of `symbol`'s last traded price. Real
    /// adapters ignore this (the exchange is the source of truth); a paper
    /// broker needs it as the reference price for simulated fills.
    fn mark_price(&mut self, _symbol: &str, _price: Decimal, _at: DateTime<Utc>) {}
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation. Only used by the live/paper runtime loop for
/// heartbeats and event timestamps — strategies never see this; their
/// `current_time` always comes from the bar being processed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
