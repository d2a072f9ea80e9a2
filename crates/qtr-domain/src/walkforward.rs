use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single in-sample / out-of-sample window.
///
/// Invariant: `is_end = is_start + is_days`, `oos_start = is_end`,
/// `oos_end = oos_start + oos_days`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkForwardWindow {
    pub window_id: u32,
    pub is_start: DateTime<Utc>,
    pub is_end: DateTime<Utc>,
    pub oos_start: DateTime<Utc>,
    pub oos_end: DateTime<Utc>,
}

impl WalkForwardWindow {
    pub fn new(window_id: u32, is_start: DateTime<Utc>, is_days: i64, oos_days: i64) -> Self {
        let is_end = is_start + chrono::Duration::days(is_days);
        let oos_start = is_end;
        let oos_end = oos_start + chrono::Duration::days(oos_days);
        Self {
            window_id,
            is_start,
            is_end,
            oos_start,
            oos_end,
        }
    }
}

/// Generate rolling windows over `[start, end)`, stepping by `step_days`.
/// Stops once a window's `oos_end` would exceed `end`.
pub fn generate_windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    is_days: i64,
    oos_days: i64,
    step_days: i64,
) -> Vec<WalkForwardWindow> {
    debug_assert!(step_days > 0, "step_days must be > 0");
    let mut windows = Vec::new();
    let mut window_id = 0u32;
    let mut cursor = start;
    loop {
        let candidate = WalkForwardWindow::new(window_id, cursor, is_days, oos_days);
        if candidate.oos_end > end {
            break;
        }
        windows.push(candidate);
        window_id += 1;
        cursor += chrono::Duration::days(step_days);
    }
    windows
}
