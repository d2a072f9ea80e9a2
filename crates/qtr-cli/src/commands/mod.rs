pub mod backtest;
pub mod run;
pub mod walkforward;
