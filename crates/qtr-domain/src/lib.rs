//! Shared domain types for the trading core: bars, signals, orders, fills,
//! positions, strategy bundles/policies, and walk-forward windows.
//!
//! This crate is intentionally inert — no I/O, no async, no broker or data
//! adapters. Everything here is plain data plus the invariants that make it
//! safe to pass between the bar engine, the fill simulator, and the risk
//! engine without re-validating at every boundary.

pub mod bar;
pub mod bundle;
pub mod enums;
pub mod fill;
pub mod order;
pub mod policy;
pub mod position;
pub mod signal;
pub mod walkforward;

pub use bar::{Bar, BarValidationError};
pub use bundle::{StrategyBundle, StrategyMeta, StrategySchemaError, Timeframe};
pub use enums::{
    Market, OrderSide, OrderStatus, OrderType, PositionSide, SignalAction, TradingMode,
};
pub use fill::Fill;
pub use order::{Order, OrderValidationError};
pub use policy::{
    CostOverride, CostPolicy, PolicyOverrides, PolicySet, RiskOverride, RiskPolicy,
    SizingOverride, SizingPolicy,
};
pub use position::Position;
pub use signal::Signal;
pub use walkforward::{generate_windows, WalkForwardWindow};
