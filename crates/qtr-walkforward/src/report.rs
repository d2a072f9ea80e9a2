use std::fmt::Write as _;

use crate::types::WalkForwardReport;

/// Render a human-readable walk-forward summary, OOS-first since that's the
/// number that matters for deployment decisions.
pub fn format_report(strategy_name: &str, report: &WalkForwardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "WALK-FORWARD VALIDATION REPORT");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Strategy: {strategy_name}");
    let _ = writeln!(out, "Windows: {}", report.windows.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out, "OUT-OF-SAMPLE PERFORMANCE");
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out, "Average return: {:.2}%", to_f64(report.avg_oos_return_pct));
    let _ = writeln!(out, "Average sharpe: {:.2}", to_f64(report.avg_oos_sharpe));
    let _ = writeln!(out, "Average win rate: {:.1}%", to_f64(report.avg_oos_win_rate_pct));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out, "OVERFITTING ANALYSIS");
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(
        out,
        "Return degradation (IS - OOS): {:.2}%",
        to_f64(report.is_return_degradation)
    );
    let _ = writeln!(
        out,
        "Sharpe degradation (IS - OOS): {:.2}",
        to_f64(report.is_sharpe_degradation)
    );
    if report.overfitting_return_flag {
        let _ = writeln!(out, "WARNING: significant return degradation, possible overfitting");
    }
    if report.overfitting_sharpe_flag {
        let _ = writeln!(out, "WARNING: significant sharpe degradation, possible overfitting");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(60));
    let _ = writeln!(out, "PER-WINDOW RESULTS");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for w in &report.windows {
        let _ = writeln!(
            out,
            "Window {}: IS={:+.2}% | OOS={:+.2}% | trades={}",
            w.window.window_id,
            to_f64(w.in_sample.metrics.total_return_pct),
            to_f64(w.out_of_sample.metrics.total_return_pct),
            w.out_of_sample.metrics.total_trades,
        );
    }
    let _ = writeln!(out, "{}", "=".repeat(60));
    out
}

fn to_f64(d: rust_decimal::Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().unwrap_or(0.0)
}
