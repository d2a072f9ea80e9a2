//! Per-market kill switch state machine: `Armed -> Triggered(reason, by, at)`.
//!
//! Fail-closed on construction: a fresh [`KillSwitch`] always boots `Armed`
//! only via explicit construction, never restored from a persisted
//! `Triggered` state without the caller re-affirming it — persistence is out
//! of scope here, but callers wiring this up from a restart should treat any
//! persisted `Triggered` record as sticky and re-construct via
//! [`KillSwitch::booted_triggered`], never silently re-arm.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::types::{KillSwitchEvent, KillSwitchReason};

#[derive(Clone, Debug, PartialEq)]
pub enum KillSwitchState {
    Armed,
    Triggered(KillSwitchEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KillSwitch {
    market: String,
    state: KillSwitchState,
}

impl KillSwitch {
    pub fn armed(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            state: KillSwitchState::Armed,
        }
    }

    /// Reconstruct a kill switch that was left `Triggered` before a restart.
    /// The reason is preserved; only [`KillSwitch::reset`] can re-arm it.
    pub fn booted_triggered(market: impl Into<String>, event: KillSwitchEvent) -> Self {
        Self {
            market: market.into(),
            state: KillSwitchState::Triggered(event),
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.state, KillSwitchState::Triggered(_))
    }

    pub fn state(&self) -> &KillSwitchState {
        &self.state
    }

    /// Trigger the kill switch. Idempotent: re-triggering an already-triggered
    /// switch is a no-op that logs and keeps the original event.
    pub fn trigger(&mut self, reason: KillSwitchReason, triggered_by: impl Into<String>, at: DateTime<Utc>) {
        if self.is_triggered() {
            warn!(market = %self.market, "kill switch already triggered, ignoring duplicate trigger");
            return;
        }
        let event = KillSwitchEvent::new(reason, triggered_by, at);
        self.state = KillSwitchState::Triggered(event);
    }

    pub fn trigger_with_event(&mut self, event: KillSwitchEvent) {
        if self.is_triggered() {
            warn!(market = %self.market, "kill switch already triggered, ignoring duplicate trigger");
            return;
        }
        self.state = KillSwitchState::Triggered(event);
    }

    /// Manual-only reset back to `Armed`. Never called automatically.
    pub fn reset(&mut self) {
        if !self.is_triggered() {
            warn!(market = %self.market, "kill switch reset requested while already armed");
        }
        self.state = KillSwitchState::Armed;
    }
}
