//! Live/paper execution runtime: ports a strategy already validated in
//! backtest can run against a real or paper data feed and broker without
//! any code changes on the strategy side.

pub mod event_sink;
pub mod order_manager;
pub mod paper_broker;
pub mod ports;
pub mod runtime;

pub use event_sink::{EventSink, TracingEventSink};
pub use order_manager::OrderManager;
pub use paper_broker::PaperBroker;
pub use ports::{Broker, Clock, DataFeed, DataFeedError, OrderError, SystemClock};
pub use runtime::{LiveRuntime, RuntimeConfig, RuntimeError};
