//! End-to-end scenario: a drawdown breach trips the kill switch and the next
//! signal is rejected.

use rust_decimal_macros::dec;

use qtr_risk::{evaluate, KillSwitch, KillSwitchReason, RequestKind, RiskConfig, RiskManager, RiskVerdict};

#[test]
fn drawdown_breach_trips_kill_switch_and_blocks_the_next_order() {
    let config = RiskConfig {
        max_drawdown_pct: dec!(10),
        daily_loss_limit_pct: dec!(50),
    };
    let mut risk = RiskManager::new(config, dec!(100000));
    let mut kill_switch = KillSwitch::armed("US");

    let updates = [dec!(100000), dec!(95000), dec!(90000), dec!(89999.99)];
    let mut breached = false;
    for equity in updates {
        let alerts = risk.update_equity(equity);
        for alert in alerts {
            breached = true;
            if !kill_switch.is_triggered() {
                kill_switch.trigger(KillSwitchReason::DrawdownBreach, "risk_manager", chrono::Utc::now());
            }
            let _ = alert;
        }
    }

    assert!(breached, "drawdown past 10% must raise an alert");
    assert!(kill_switch.is_triggered());
    assert_eq!(evaluate(&kill_switch, RequestKind::NewOrder), RiskVerdict::Reject);
}
