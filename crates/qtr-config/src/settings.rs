//! Typed view over the merged config JSON. Only the ambient concerns this
//! crate actually has a use for are modeled here — no database, queue, or
//! broker-adapter settings, since persistence and the event bus are out of
//! scope for this system.

use rust_decimal::Decimal;
use serde::Deserialize;

use qtr_domain::{Market, TradingMode};
use qtr_risk::RiskConfig;

use crate::layered::LoadedConfig;

#[derive(Debug, Clone)]
pub enum ConfigError {
    Invalid(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(e) => write!(f, "config does not match the expected schema: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskSettings {
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: Decimal,
    #[serde(default = "default_daily_loss_limit_pct")]
    pub daily_loss_limit_pct: Decimal,
}

fn default_max_drawdown_pct() -> Decimal {
    RiskConfig::sane_defaults().max_drawdown_pct
}

fn default_daily_loss_limit_pct() -> Decimal {
    RiskConfig::sane_defaults().daily_loss_limit_pct
}

impl Default for RiskSettings {
    fn default() -> Self {
        let defaults = RiskConfig::sane_defaults();
        Self {
            max_drawdown_pct: defaults.max_drawdown_pct,
            daily_loss_limit_pct: defaults.daily_loss_limit_pct,
        }
    }
}

impl From<RiskSettings> for RiskConfig {
    fn from(s: RiskSettings) -> Self {
        RiskConfig {
            max_drawdown_pct: s.max_drawdown_pct,
            daily_loss_limit_pct: s.daily_loss_limit_pct,
        }
    }
}

/// Cost-model overrides for the fill simulator. `None` fields fall back to
/// `qtr_fillsim::default_costs` for the engine's market.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FillLogicSettings {
    pub base_slippage_bps: Option<Decimal>,
    pub commission_bps: Option<Decimal>,
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u32,
}

fn default_min_latency_ms() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalkForwardSettings {
    #[serde(default = "default_is_days")]
    pub is_days: i64,
    #[serde(default = "default_oos_days")]
    pub oos_days: i64,
    #[serde(default = "default_step_days")]
    pub step_days: i64,
}

fn default_is_days() -> i64 {
    90
}
fn default_oos_days() -> i64 {
    30
}
fn default_step_days() -> i64 {
    30
}

impl Default for WalkForwardSettings {
    fn default() -> Self {
        Self {
            is_days: default_is_days(),
            oos_days: default_oos_days(),
            step_days: default_step_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub mode: TradingMode,
    pub market: Market,
    pub symbols: Vec<String>,
    #[serde(default = "default_interval")]
    pub interval: String,
    pub initial_capital: Decimal,
    #[serde(default = "default_position_size_pct")]
    pub position_size_pct: Decimal,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub fill_logic: FillLogicSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub walkforward: WalkForwardSettings,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_position_size_pct() -> Decimal {
    Decimal::new(10, 2)
}

impl EngineConfig {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self, ConfigError> {
        serde_json::from_value(loaded.config_json.clone()).map_err(ConfigError::Invalid)
    }
}
