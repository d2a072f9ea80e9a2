use serde::{Deserialize, Serialize};

use crate::policy::PolicyOverrides;

/// Supported bar intervals a strategy may declare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "1d")]
    D1,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
        };
        write!(f, "{s}")
    }
}

/// Immutable strategy metadata, declared by a bundle and validated at load time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyMeta {
    pub name: String,
    pub universe: Vec<String>,
    pub timeframe: Timeframe,
    pub required_fields: Vec<String>,
    pub session: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StrategySchemaError {
    EmptyUniverse,
    EmptyRequiredFields,
    EmptyName,
}

impl std::fmt::Display for StrategySchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategySchemaError::EmptyUniverse => write!(f, "meta.universe must be non-empty"),
            StrategySchemaError::EmptyRequiredFields => {
                write!(f, "meta.required_fields must be non-empty")
            }
            StrategySchemaError::EmptyName => write!(f, "meta.name must be non-empty"),
        }
    }
}

impl std::error::Error for StrategySchemaError {}

impl StrategyMeta {
    pub fn new(
        name: impl Into<String>,
        universe: Vec<String>,
        timeframe: Timeframe,
        required_fields: Vec<String>,
        session: Option<String>,
    ) -> Result<Self, StrategySchemaError> {
        let meta = Self {
            name: name.into(),
            universe,
            timeframe,
            required_fields,
            session,
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> Result<(), StrategySchemaError> {
        if self.name.trim().is_empty() {
            return Err(StrategySchemaError::EmptyName);
        }
        if self.universe.is_empty() {
            return Err(StrategySchemaError::EmptyUniverse);
        }
        if self.required_fields.is_empty() {
            return Err(StrategySchemaError::EmptyRequiredFields);
        }
        Ok(())
    }
}

/// A strategy's externally-observable contract: metadata plus optional policy
/// overrides. The zero-arg strategy builder itself is not representable as
/// plain data — it lives on the loader side (`qtr-strategy`), which pairs a
/// validated `StrategyBundle` with a boxed `Strategy` factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyBundle {
    pub meta: StrategyMeta,
    pub overrides: Option<PolicyOverrides>,
}

impl StrategyBundle {
    pub fn new(meta: StrategyMeta, overrides: Option<PolicyOverrides>) -> Self {
        Self { meta, overrides }
    }

    pub fn resolved_overrides(&self) -> PolicyOverrides {
        self.overrides.clone().unwrap_or_default()
    }
}
