//! Strategy plugin boundary: a static import sandbox + bundle loader for
//! third-party strategies, a legacy loader for trusted first-party
//! strategies, a lifecycle host, and a catalogue registry.

pub mod built_in;
pub mod bundle_loader;
pub mod host;
pub mod legacy_loader;
pub mod registry;
pub mod sandbox;
pub mod types;

pub use built_in::TurtleBreakoutStrategy;
pub use bundle_loader::{load_bundle, BundleLoadError, LoadedBundle, StrategyFactory as BundleFactory};
pub use host::{StrategyHost, StrategyHostError};
pub use legacy_loader::{LegacyResult, LegacyStrategy, LegacyStrategyWrapper, TeamType};
pub use registry::{PluginRegistry, RegistryError};
pub use sandbox::{validate_strategy_imports, ImportViolation, SandboxError, ValidationOutcome};
pub use types::{RecentBarsWindow, Strategy, StrategyContext, StrategyLifecycle};

/// Build a registry pre-populated with the strategies shipped with this engine.
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    let meta = qtr_domain::StrategyMeta::new(
        "turtle_breakout",
        vec!["*".to_string()],
        qtr_domain::Timeframe::D1,
        vec!["open".to_string(), "high".to_string(), "low".to_string(), "close".to_string()],
        None,
    )
    .expect("built-in strategy metadata is valid");
    registry
        .register(meta, Box::new(|| Box::new(TurtleBreakoutStrategy::new())))
        .expect("built-in strategy name is unique");
    registry
}
