//! Single-strategy backtest engine: the bar-by-bar algorithm that resolves
//! strategy signals into fills, tracks positions, and reports trades, an
//! equity curve, and summary metrics.

pub mod engine;
pub mod metrics;
pub mod types;

pub use engine::{BacktestError, BarEngine};
pub use metrics::compute_metrics;
pub use types::{BacktestConfig, BacktestMetrics, BacktestReport, TradeRecord};
