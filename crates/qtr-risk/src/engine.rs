//! Gates a new-order request against the kill switch. The kill switch is the
//! single sticky authority: once triggered, everything but a flatten request
//! is rejected until a manual reset.

use crate::kill_switch::KillSwitch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    NewOrder,
    Flatten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskVerdict {
    Allow,
    Reject,
}

/// Evaluate whether `kind` may proceed given the kill switch's current state.
/// New signals are dropped immediately while triggered; flattens are always
/// allowed through since they only reduce risk.
pub fn evaluate(kill_switch: &KillSwitch, kind: RequestKind) -> RiskVerdict {
    if !kill_switch.is_triggered() {
        return RiskVerdict::Allow;
    }
    match kind {
        RequestKind::Flatten => RiskVerdict::Allow,
        RequestKind::NewOrder => RiskVerdict::Reject,
    }
}
