//! Risk engine: equity-based drawdown/daily-loss detection, a per-market kill
//! switch state machine, and position tracking by fill application.

pub mod engine;
pub mod kill_switch;
pub mod position_tracker;
pub mod risk_manager;
pub mod types;

pub use engine::{evaluate, RequestKind, RiskVerdict};
pub use kill_switch::{KillSwitch, KillSwitchState};
pub use position_tracker::PositionTracker;
pub use risk_manager::RiskManager;
pub use types::{KillSwitchEvent, KillSwitchReason, RiskAlert, RiskConfig};
