//! Bundle loader: validates a strategy source file's imports, then pairs its
//! declared [`StrategyBundle`] with a factory closure that builds the boxed
//! strategy instance.
//!
//! A compiled target cannot `exec` a source file and inspect its module
//! object the way the original loader does, so "module load" here is the
//! caller registering a factory alongside the bundle it was built from —
//! the sandbox step still runs first, against the real source text, before
//! that factory is ever invoked.

use qtr_domain::{PolicySet, StrategyBundle};

use crate::sandbox::{validate_strategy_imports, ValidationOutcome};
use crate::types::Strategy;

pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy> + Send>;

#[derive(Debug, PartialEq, Eq)]
pub enum BundleLoadError {
    Sandbox(ValidationOutcome),
    MissingBundle,
}

impl std::fmt::Display for BundleLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleLoadError::Sandbox(e) => write!(f, "sandbox rejected strategy source: {e}"),
            BundleLoadError::MissingBundle => {
                write!(f, "strategy module exposes neither get_bundle() nor BUNDLE")
            }
        }
    }
}

impl std::error::Error for BundleLoadError {}

/// A bundle that has passed the sandbox and schema checks, with its policy
/// already composed.
pub struct LoadedBundle {
    pub bundle: StrategyBundle,
    pub policy: PolicySet,
    pub factory: StrategyFactory,
}

/// Validate `source` against the import sandbox, then pair `bundle` with
/// `factory` and compose its resolved policy. `bundle` already carries the
/// metadata schema validation performed by [`qtr_domain::StrategyMeta::new`];
/// this function is the integration point the loader pipeline hangs off.
pub fn load_bundle(
    source: &str,
    bundle: StrategyBundle,
    factory: StrategyFactory,
) -> Result<LoadedBundle, BundleLoadError> {
    validate_strategy_imports(source).map_err(BundleLoadError::Sandbox)?;

    let policy = PolicySet::merge(&bundle.resolved_overrides());

    Ok(LoadedBundle {
        bundle,
        policy,
        factory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtr_domain::{Signal, StrategyMeta, Timeframe};

    struct NoopStrategy;

    impl Strategy for NoopStrategy {
        fn name(&self) -> &str {
            "noop"
        }

        fn on_bar(
            &mut self,
            _bar: &qtr_domain::Bar,
            _ctx: &crate::types::StrategyContext,
        ) -> Vec<Signal> {
            Vec::new()
        }
    }

    fn meta() -> StrategyMeta {
        StrategyMeta::new(
            "turtle_breakout",
            vec!["BTC-USDT".to_string()],
            Timeframe::H1,
            vec!["high".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn clean_source_loads_successfully() {
        let bundle = StrategyBundle::new(meta(), None);
        let source = "use qtr_domain::Bar;\n";
        let loaded = load_bundle(source, bundle, Box::new(|| Box::new(NoopStrategy)));
        assert!(loaded.is_ok());
    }

    #[test]
    fn source_with_denied_import_is_rejected() {
        let bundle = StrategyBundle::new(meta(), None);
        let source = "use reqwest::Client;\n";
        let loaded = load_bundle(source, bundle, Box::new(|| Box::new(NoopStrategy)));
        assert!(matches!(loaded, Err(BundleLoadError::Sandbox(_))));
    }
}
