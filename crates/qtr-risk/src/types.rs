use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Risk thresholds, expressed as percentages (e.g. `20` means 20%), per
/// [`crate::PolicySet`]'s risk section but with the engine's own defaults when
/// no bundle overrides them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskConfig {
    pub max_drawdown_pct: Decimal,
    pub daily_loss_limit_pct: Decimal,
}

impl RiskConfig {
    pub fn sane_defaults() -> Self {
        Self {
            max_drawdown_pct: Decimal::new(20, 0),
            daily_loss_limit_pct: Decimal::new(10, 0),
        }
    }
}

/// The reason a kill switch moved to `Triggered`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KillSwitchReason {
    DrawdownBreach,
    DailyLossBreach,
    Manual,
}

impl std::fmt::Display for KillSwitchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KillSwitchReason::DrawdownBreach => write!(f, "drawdown_breach"),
            KillSwitchReason::DailyLossBreach => write!(f, "daily_loss_breach"),
            KillSwitchReason::Manual => write!(f, "manual"),
        }
    }
}

/// Broadcast when a kill switch transitions `Armed -> Triggered`.
#[derive(Clone, Debug, PartialEq)]
pub struct KillSwitchEvent {
    pub reason: KillSwitchReason,
    pub triggered_by: String,
    pub triggered_at: chrono::DateTime<chrono::Utc>,
    pub evidence: BTreeMap<String, String>,
}

impl KillSwitchEvent {
    pub fn new(
        reason: KillSwitchReason,
        triggered_by: impl Into<String>,
        triggered_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            reason,
            triggered_by: triggered_by.into(),
            triggered_at,
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.evidence.insert(k.into(), v.into());
        self
    }
}

/// A risk-alert fired by [`crate::RiskManager`] on an equity update. Informational —
/// the kill switch decides whether a trigger follows.
#[derive(Clone, Debug, PartialEq)]
pub enum RiskAlert {
    DrawdownBreach { drawdown_pct: Decimal, threshold_pct: Decimal },
    DailyLossBreach { daily_loss_pct: Decimal, threshold_pct: Decimal },
}
