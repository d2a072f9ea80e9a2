//! A reference strategy shipped alongside the engine for smoke-testing the
//! CLI end to end. Long-only trend following: enter on a 20-bar high
//! breakout, exit on a 10-bar low breakdown. Not a sandboxed bundle —
//! registered directly into a [`crate::PluginRegistry`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use qtr_domain::{Bar, Signal, SignalAction};

use crate::types::{Strategy, StrategyContext};

pub struct TurtleBreakoutStrategy {
    entry_lookback: usize,
    exit_lookback: usize,
    in_position: BTreeMap<String, bool>,
}

impl TurtleBreakoutStrategy {
    pub fn new() -> Self {
        Self {
            entry_lookback: 20,
            exit_lookback: 10,
            in_position: BTreeMap::new(),
        }
    }
}

impl Default for TurtleBreakoutStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for TurtleBreakoutStrategy {
    fn name(&self) -> &str {
        "turtle_breakout"
    }

    fn reset(&mut self) {
        self.in_position.clear();
    }

    fn on_bar(&mut self, bar: &Bar, ctx: &StrategyContext) -> Vec<Signal> {
        let bars = ctx.recent.as_slice();
        let in_position = *self.in_position.get(&bar.symbol).unwrap_or(&false);

        if !in_position {
            if bars.len() < self.entry_lookback {
                return Vec::new();
            }
            let entry_high = highest_high(&bars[bars.len() - self.entry_lookback..]);
            if bar.close > entry_high {
                self.in_position.insert(bar.symbol.clone(), true);
                return vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::EnterLong,
                    Decimal::ONE,
                    bar.close,
                    self.name(),
                )];
            }
        } else {
            if bars.len() < self.exit_lookback {
                return Vec::new();
            }
            let exit_low = lowest_low(&bars[bars.len() - self.exit_lookback..]);
            if bar.close < exit_low {
                self.in_position.insert(bar.symbol.clone(), false);
                return vec![Signal::new(
                    ctx.market,
                    ctx.mode,
                    bar.symbol.clone(),
                    bar.timestamp,
                    SignalAction::ExitLong,
                    Decimal::ONE,
                    bar.close,
                    self.name(),
                )];
            }
        }

        Vec::new()
    }
}

fn highest_high(bars: &[Bar]) -> Decimal {
    bars.iter().map(|b| b.high).max().expect("non-empty slice")
}

fn lowest_low(bars: &[Bar]) -> Decimal {
    bars.iter().map(|b| b.low).min().expect("non-empty slice")
}
