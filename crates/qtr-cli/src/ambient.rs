//! Config-file-backed ambient settings (risk thresholds, fill-cost
//! overrides, logging, walk-forward window sizing) layered under whatever
//! the CLI flags specify directly. Unlike [`qtr_config::EngineConfig`],
//! nothing here is required — a bare `qtr backtest ...` invocation with no
//! `--config` runs on defaults.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

use qtr_config::{load_layered_yaml, FillLogicSettings, LoggingSettings, RiskSettings, WalkForwardSettings};

#[derive(Debug, Clone, Deserialize)]
pub struct AmbientSettings {
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub fill_logic: FillLogicSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub walkforward: WalkForwardSettings,
    /// Fraction of capital committed to a single new position. Not a CLI
    /// flag — the CLI surface leaves sizing to the config layer.
    #[serde(default = "default_position_size_pct")]
    pub position_size_pct: Decimal,
    #[serde(default)]
    pub bar_history_len: Option<usize>,
}

fn default_position_size_pct() -> Decimal {
    Decimal::new(10, 2)
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            risk: RiskSettings::default(),
            fill_logic: FillLogicSettings::default(),
            logging: LoggingSettings::default(),
            walkforward: WalkForwardSettings::default(),
            position_size_pct: default_position_size_pct(),
            bar_history_len: None,
        }
    }
}

pub fn load_ambient_settings(config_paths: &[String]) -> Result<AmbientSettings> {
    if config_paths.is_empty() {
        return Ok(AmbientSettings::default());
    }
    let paths: Vec<&str> = config_paths.iter().map(String::as_str).collect();
    let loaded = load_layered_yaml(&paths)?;
    Ok(serde_json::from_value(loaded.config_json)?)
}
