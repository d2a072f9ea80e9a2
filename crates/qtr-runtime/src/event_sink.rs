//! Event bus stand-in. The real per-subject bus (bars, signals, orders,
//! fills, risk alerts, kill switch, health) is a persistence/transport
//! collaborator out of this crate's scope — [`TracingEventSink`] is the
//! in-tree default so the runtime always has somewhere to emit to.

use qtr_domain::{Fill, Order, Signal};
use qtr_risk::{KillSwitchEvent, RiskAlert};

pub trait EventSink {
    fn emit_signal(&self, _signal: &Signal) {}
    fn emit_order(&self, _order: &Order) {}
    fn emit_fill(&self, _fill: &Fill) {}
    fn emit_risk_alert(&self, _alert: &RiskAlert) {}
    fn emit_kill_switch(&self, _event: &KillSwitchEvent) {}
    fn emit_health(&self, _message: &str) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit_signal(&self, signal: &Signal) {
        tracing::info!(symbol = %signal.symbol, action = ?signal.action, "signal");
    }

    fn emit_order(&self, order: &Order) {
        tracing::info!(symbol = %order.symbol, side = %order.side, status = ?order.status, "order");
    }

    fn emit_fill(&self, fill: &Fill) {
        tracing::info!(symbol = %fill.symbol, price = %fill.price, quantity = %fill.quantity, "fill");
    }

    fn emit_risk_alert(&self, alert: &RiskAlert) {
        tracing::warn!(?alert, "risk alert");
    }

    fn emit_kill_switch(&self, event: &KillSwitchEvent) {
        tracing::error!(reason = %event.reason, "kill switch triggered");
    }

    fn emit_health(&self, message: &str) {
        tracing::info!(message, "health");
    }
}
