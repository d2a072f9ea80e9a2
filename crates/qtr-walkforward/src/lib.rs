//! Walk-forward validation: rolls a strategy through consecutive
//! in-sample/out-of-sample windows, running each half as an independent
//! backtest, and reports OOS-focused aggregates plus overfitting flags.

pub mod report;
pub mod types;
pub mod validator;

pub use report::format_report;
pub use types::{WalkForwardConfig, WalkForwardReport, WindowResult};
pub use validator::{run, WalkForwardError};
