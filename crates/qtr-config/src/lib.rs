//! Layered config loading, typed settings, and secret resolution — the
//! ambient configuration stack shared by the backtest, walk-forward, and
//! live/paper runtime entry points.

pub mod layered;
pub mod secrets;
pub mod settings;

pub use layered::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use secrets::{resolve_secrets_for_mode, ResolvedSecrets};
pub use settings::{ConfigError, EngineConfig, FillLogicSettings, LoggingSettings, RiskSettings, WalkForwardSettings};
