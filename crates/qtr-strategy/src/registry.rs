//! Catalogue of strategies available to a runtime, keyed by name. Separate
//! from [`crate::host::StrategyHost`]: the registry is "what's available",
//! the host is "what's currently running". Factories are deterministic
//! closures; any seeded randomness they capture is the caller's
//! responsibility to thread through explicitly.

use std::collections::BTreeMap;

use qtr_domain::StrategyMeta;

use crate::types::Strategy;

pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateName(String),
    NotFound(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => {
                write!(f, "strategy '{name}' is already registered")
            }
            RegistryError::NotFound(name) => write!(f, "strategy '{name}' is not registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

struct Entry {
    meta: StrategyMeta,
    factory: StrategyFactory,
}

#[derive(Default)]
pub struct PluginRegistry {
    entries: BTreeMap<String, Entry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, meta: StrategyMeta, factory: StrategyFactory) -> Result<(), RegistryError> {
        if self.entries.contains_key(&meta.name) {
            return Err(RegistryError::DuplicateName(meta.name.clone()));
        }
        self.entries.insert(meta.name.clone(), Entry { meta, factory });
        Ok(())
    }

    pub fn list(&self) -> Vec<&StrategyMeta> {
        self.entries.values().map(|e| &e.meta).collect()
    }

    pub fn meta(&self, name: &str) -> Result<&StrategyMeta, RegistryError> {
        self.entries
            .get(name)
            .map(|e| &e.meta)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Strategy>, RegistryError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        Ok((entry.factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtr_domain::{Bar, Signal, Timeframe};

    struct NoopStrategy;

    impl Strategy for NoopStrategy {
        fn name(&self) -> &str {
            "noop"
        }

        fn on_bar(&mut self, _bar: &Bar, _ctx: &crate::types::StrategyContext) -> Vec<Signal> {
            Vec::new()
        }
    }

    fn meta(name: &str) -> StrategyMeta {
        StrategyMeta::new(
            name,
            vec!["BTC-USDT".to_string()],
            Timeframe::H1,
            vec!["high".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn register_then_instantiate_round_trips() {
        let mut reg = PluginRegistry::new();
        reg.register(meta("turtle_breakout"), Box::new(|| Box::new(NoopStrategy)))
            .unwrap();
        assert!(reg.instantiate("turtle_breakout").is_ok());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register(meta("turtle_breakout"), Box::new(|| Box::new(NoopStrategy)))
            .unwrap();
        let err = reg
            .register(meta("turtle_breakout"), Box::new(|| Box::new(NoopStrategy)))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("turtle_breakout".to_string()));
    }

    #[test]
    fn instantiate_unknown_name_errors() {
        let reg = PluginRegistry::new();
        assert!(reg.instantiate("missing").is_err());
    }

    #[test]
    fn list_is_sorted_by_name() {
        let mut reg = PluginRegistry::new();
        reg.register(meta("zeta"), Box::new(|| Box::new(NoopStrategy)))
            .unwrap();
        reg.register(meta("alpha"), Box::new(|| Box::new(NoopStrategy)))
            .unwrap();
        let names: Vec<_> = reg.list().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
