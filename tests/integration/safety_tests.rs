//! Integration tests for the safety path: arbiter veto, fail-closed
//! behaviour, gateway defense-in-depth, and lockout recovery.

use crate::mock_hw::{MockHardware, RecordingSink};

use airlock::app::service::AirlockService;
use airlock::config::AirlockConfig;
use airlock::error::{LockoutReason, Rejected};
use airlock::fsm::AirlockState;
use airlock::fsm::context::{Gate, SensorSnapshot};
use airlock::gateway::GateGateway;
use airlock::sensors::LineId;
use airlock::status::StatusColor;

fn default_app() -> (AirlockService, MockHardware, RecordingSink) {
    let mut app = AirlockService::new(AirlockConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

// ── Fail-closed on obstruction ────────────────────────────────

#[test]
fn obstruction_mid_motion_forces_both_gates_closed_same_cycle() {
    let (mut app, mut hw, mut sink) = default_app();

    // Start a front entry: gate A commanded open.
    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert!(hw.gate_open(Gate::A));

    // Obstruction appears in gate A's path.
    hw.set(LineId::SafetyA, true);
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.state(), AirlockState::SafetyLocked);
    assert!(!hw.gate_open(Gate::A), "gate A closed within the same cycle");
    assert!(!hw.gate_open(Gate::B));
    assert!(sink.saw_lockout_entered());
    assert_eq!(
        app.lockout_mask(),
        LockoutReason::GateAObstructed.mask()
    );
}

#[test]
fn either_safety_line_locks_out() {
    for line in [LineId::SafetyA, LineId::SafetyB] {
        let (mut app, mut hw, mut sink) = default_app();
        hw.set(line, true);
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), AirlockState::SafetyLocked, "line {line}");
        assert!(!hw.gate_open(Gate::A));
        assert!(!hw.gate_open(Gate::B));
    }
}

#[test]
fn lockout_with_occupied_chamber_reports_middle_occupied() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Middle, true);
    hw.set(LineId::SafetyB, true);
    app.tick(&mut hw, &mut sink);

    // Internally locked, externally "agent trapped mid-chamber".
    assert_eq!(app.state(), AirlockState::SafetyLocked);
    assert_eq!(app.reported_state(), AirlockState::MiddleOccupied);
    assert_eq!(hw.indicator(), Some(StatusColor::Alert));
}

#[test]
fn lockout_with_empty_chamber_alerts_as_safety_locked() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::SafetyA, true);
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.reported_state(), AirlockState::SafetyLocked);
    assert_eq!(hw.indicator(), Some(StatusColor::Alert));
}

// ── Recovery ──────────────────────────────────────────────────

#[test]
fn recovery_to_idle_within_one_cycle_of_clear() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::SafetyA, true);
    hw.set(LineId::SafetyB, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::SafetyLocked);

    // One line clears — still locked out.
    hw.set(LineId::SafetyA, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::SafetyLocked);

    // Both clear — Idle on the very next cycle.
    hw.set(LineId::SafetyB, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);
    assert!(sink.saw_lockout_cleared());
    assert_eq!(app.lockout_mask(), 0);
}

#[test]
fn sequencing_resumes_after_recovery() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::SafetyA, true);
    app.tick(&mut hw, &mut sink);
    hw.set(LineId::SafetyA, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);

    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::FrontEntering);
    assert!(hw.gate_open(Gate::A));
}

// ── Sensor faults fail closed ─────────────────────────────────

#[test]
fn unreadable_line_fails_closed_into_lockout() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.fail(LineId::MovingB, true);
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.state(), AirlockState::SafetyLocked);
    assert!(app.lockout_mask() & LockoutReason::SensorFault.mask() != 0);
    assert!(!hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));
    assert_eq!(hw.indicator(), Some(StatusColor::Alert));
}

#[test]
fn line_recovery_clears_sensor_fault_lockout() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.fail(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::SafetyLocked);

    hw.fail(LineId::Front, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);
}

// ── Lockout blocks entry attempts ─────────────────────────────

#[test]
fn entry_request_ignored_while_locked_out() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::SafetyB, true);
    hw.set(LineId::Front, true);
    for _ in 0..10 {
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), AirlockState::SafetyLocked);
        assert!(!hw.gate_open(Gate::A));
        assert!(!hw.gate_open(Gate::B));
    }
    assert!(!hw.both_gates_ever_open());
}

// ── Gateway veto (defense in depth) ───────────────────────────

#[test]
fn gateway_veto_overrides_sequencer_intent() {
    // Even a caller that bypasses the arbiter cannot open an obstructed
    // gate: the gateway is an independent enforcement point.
    let mut gateway = GateGateway::new();
    let mut hw = MockHardware::new();
    let snap = SensorSnapshot {
        safety_a: true,
        ..SensorSnapshot::default()
    };

    let outcome = gateway.command(Gate::A, true, &snap, &mut hw);
    assert_eq!(outcome, Err(Rejected { gate: Gate::A }));
    assert!(!hw.gate_open(Gate::A), "actuator output remains closed");
    assert_eq!(gateway.rejected_count(), 1);

    // The un-obstructed gate is unaffected, and close always succeeds.
    assert!(gateway.command(Gate::B, true, &snap, &mut hw).is_ok());
    assert!(gateway.command(Gate::B, false, &snap, &mut hw).is_ok());
    assert!(gateway.command(Gate::A, false, &snap, &mut hw).is_ok());
}
