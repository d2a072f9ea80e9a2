use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-field overrides of the built-in cost model. `None` means "inherit default".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostOverride {
    pub commission_bps: Option<Decimal>,
    pub slippage_bps: Option<Decimal>,
    pub min_fee: Option<Decimal>,
}

/// Per-field overrides of the built-in risk limits. `None` means "inherit default".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskOverride {
    pub max_leverage: Option<Decimal>,
    pub max_position_notional: Option<Decimal>,
    pub max_drawdown: Option<Decimal>,
    pub kill_switch_dd: Option<Decimal>,
}

/// Per-field overrides of the built-in sizing model. `None` means "inherit default".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingOverride {
    pub target_vol: Option<Decimal>,
    pub max_gross_exposure: Option<Decimal>,
    pub per_trade_risk: Option<Decimal>,
}

/// A strategy bundle's optional partial overrides. Any of the three sections
/// may be omitted entirely, in which case every field in that section inherits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyOverrides {
    pub cost: Option<CostOverride>,
    pub risk: Option<RiskOverride>,
    pub sizing: Option<SizingOverride>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostPolicy {
    pub commission_bps: Decimal,
    pub slippage_bps: Decimal,
    pub min_fee: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub max_leverage: Decimal,
    pub max_position_notional: Decimal,
    pub max_drawdown: Decimal,
    pub kill_switch_dd: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizingPolicy {
    pub target_vol: Decimal,
    pub max_gross_exposure: Decimal,
    pub per_trade_risk: Decimal,
}

/// Fully-resolved policy: no optionals, every field concrete. Produced by
/// merging a bundle's [`PolicyOverrides`] over [`PolicySet::default_policy`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    pub cost: CostPolicy,
    pub risk: RiskPolicy,
    pub sizing: SizingPolicy,
}

impl PolicySet {
    /// Conservative built-in defaults. Individual markets' commission/slippage
    /// defaults live in the fill simulator; these are the cross-market
    /// fallbacks used when a bundle does not override them.
    pub fn default_policy() -> Self {
        Self {
            cost: CostPolicy {
                commission_bps: Decimal::new(10, 0),
                slippage_bps: Decimal::new(10, 0),
                min_fee: Decimal::ZERO,
            },
            risk: RiskPolicy {
                max_leverage: Decimal::new(3, 0),
                max_position_notional: Decimal::new(100_000, 0),
                max_drawdown: Decimal::new(20, 2),
                kill_switch_dd: Decimal::new(25, 2),
            },
            sizing: SizingPolicy {
                target_vol: Decimal::new(10, 2),
                max_gross_exposure: Decimal::new(100, 2),
                per_trade_risk: Decimal::new(1, 2),
            },
        }
    }

    /// Merge a bundle's partial overrides over the built-in defaults.
    /// Per-field: `Some` wins, `None` inherits. Missing sections inherit whole.
    pub fn merge(overrides: &PolicyOverrides) -> Self {
        let base = Self::default_policy();
        let cost = match &overrides.cost {
            None => base.cost,
            Some(o) => CostPolicy {
                commission_bps: o.commission_bps.unwrap_or(base.cost.commission_bps),
                slippage_bps: o.slippage_bps.unwrap_or(base.cost.slippage_bps),
                min_fee: o.min_fee.unwrap_or(base.cost.min_fee),
            },
        };
        let risk = match &overrides.risk {
            None => base.risk,
            Some(o) => RiskPolicy {
                max_leverage: o.max_leverage.unwrap_or(base.risk.max_leverage),
                max_position_notional: o
                    .max_position_notional
                    .unwrap_or(base.risk.max_position_notional),
                max_drawdown: o.max_drawdown.unwrap_or(base.risk.max_drawdown),
                kill_switch_dd: o.kill_switch_dd.unwrap_or(base.risk.kill_switch_dd),
            },
        };
        let sizing = match &overrides.sizing {
            None => base.sizing,
            Some(o) => SizingPolicy {
                target_vol: o.target_vol.unwrap_or(base.sizing.target_vol),
                max_gross_exposure: o
                    .max_gross_exposure
                    .unwrap_or(base.sizing.max_gross_exposure),
                per_trade_risk: o.per_trade_risk.unwrap_or(base.sizing.per_trade_risk),
            },
        };
        Self { cost, risk, sizing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_equal_defaults() {
        let merged = PolicySet::merge(&PolicyOverrides::default());
        assert_eq!(merged, PolicySet::default_policy());
    }

    #[test]
    fn partial_cost_override_inherits_remaining_fields() {
        let overrides = PolicyOverrides {
            cost: Some(CostOverride {
                commission_bps: Some(Decimal::new(5, 0)),
                slippage_bps: None,
                min_fee: None,
            }),
            risk: None,
            sizing: None,
        };
        let merged = PolicySet::merge(&overrides);
        assert_eq!(merged.cost.commission_bps, Decimal::new(5, 0));
        assert_eq!(
            merged.cost.slippage_bps,
            PolicySet::default_policy().cost.slippage_bps
        );
        assert_eq!(merged.risk, PolicySet::default_policy().risk);
    }
}
