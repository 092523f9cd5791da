//! Integration tests for the AirlockService → sequencer → gateway
//! pipeline: traversal traces, tie-breaks, progress watchpoints, and
//! operator commands, all against the recording mock hardware.

use crate::mock_hw::{MockHardware, RecordingSink};

use airlock::app::commands::AppCommand;
use airlock::app::service::AirlockService;
use airlock::config::AirlockConfig;
use airlock::fsm::AirlockState;
use airlock::fsm::context::Gate;
use airlock::sensors::LineId;

fn make_app(config: AirlockConfig) -> (AirlockService, MockHardware, RecordingSink) {
    let mut app = AirlockService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn default_app() -> (AirlockService, MockHardware, RecordingSink) {
    make_app(AirlockConfig::default())
}

// ── Full entry cycle, concrete trace ─────────────────────────

#[test]
fn full_entry_cycle_concrete_trace() {
    let (mut app, mut hw, mut sink) = default_app();
    assert_eq!(app.state(), AirlockState::Idle);

    // {front} → FrontEntering, open(A)
    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::FrontEntering);
    assert!(hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));

    // {front, middle, movingA:false} → MiddleOccupied, close(A)
    hw.set(LineId::Middle, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::MiddleOccupied);
    assert!(!hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));

    // {middle, movingA:false} → open(B), BackExiting
    hw.set(LineId::Front, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::BackExiting);
    assert!(hw.gate_open(Gate::B));
    assert!(!hw.gate_open(Gate::A));

    // {back:false, movingB:false} → close(B), Idle
    hw.set(LineId::Middle, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);
    assert!(!hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));

    assert!(!hw.both_gates_ever_open(), "mutual exclusion violated");
}

#[test]
fn full_back_entry_cycle_mirrors_front() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Back, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::BackEntering);
    assert!(hw.gate_open(Gate::B));
    assert!(!hw.gate_open(Gate::A));

    hw.set(LineId::Middle, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::MiddleOccupied);
    assert!(!hw.gate_open(Gate::B));

    hw.set(LineId::Back, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::FrontExiting);
    assert!(hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));

    hw.set(LineId::Middle, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);

    assert!(!hw.both_gates_ever_open(), "mutual exclusion violated");
}

// ── Tie-break and idle behaviour ──────────────────────────────

#[test]
fn front_priority_tie_break() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Front, true);
    hw.set(LineId::Back, true);
    app.tick(&mut hw, &mut sink);

    assert_eq!(app.state(), AirlockState::FrontEntering);
    assert!(hw.gate_open(Gate::A), "front entry wins: gate A opens");
    assert!(!hw.gate_open(Gate::B), "gate B stays closed");
}

#[test]
fn idle_is_idempotent_on_empty_zones() {
    let (mut app, mut hw, mut sink) = default_app();

    for _ in 0..50 {
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), AirlockState::Idle);
    }
    assert!(!hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));
    assert!(!hw.both_gates_ever_open());
}

// ── Gate settling across cycles ───────────────────────────────

#[test]
fn entering_holds_while_gate_in_transit() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::FrontEntering);

    // Agent reaches the chamber while the gate still reports motion.
    hw.set(LineId::Middle, true);
    hw.set(LineId::MovingA, true);
    for _ in 0..5 {
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), AirlockState::FrontEntering);
    }

    hw.set(LineId::MovingA, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::MiddleOccupied);
}

#[test]
fn exit_gate_waits_for_entry_gate_to_finish_closing() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    hw.set(LineId::Middle, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::MiddleOccupied);

    // Gate A still closing — B must not open yet.
    hw.set(LineId::MovingA, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::MiddleOccupied);
    assert!(!hw.gate_open(Gate::B));

    hw.set(LineId::MovingA, false);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::BackExiting);
    assert!(hw.gate_open(Gate::B));
    assert!(!hw.both_gates_ever_open());
}

// ── Stuck-transition watchpoints ──────────────────────────────

#[test]
fn stalled_entry_raises_stuck_diagnostic_and_holds() {
    let config = AirlockConfig {
        stuck_cycle_threshold: 5,
        ..AirlockConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app(config);

    // Agent trips the front beam and then walks away: the machine waits.
    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    hw.set(LineId::Front, false);

    for _ in 0..8 {
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), AirlockState::FrontEntering, "holds position");
    }
    assert_eq!(sink.count_stuck(), 1, "diagnostic raised exactly once");
    assert_eq!(app.diagnostics().stuck_events, 1);
}

#[test]
fn simultaneous_motion_reports_raise_stuck_diagnostic() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::MovingA, true);
    hw.set(LineId::MovingB, true);
    for _ in 0..4 {
        app.tick(&mut hw, &mut sink);
    }
    assert_eq!(sink.count_stuck(), 1, "one event per anomaly episode");
    assert_eq!(app.state(), AirlockState::Idle, "machine holds position");

    // Episode ends and recurs → a second event.
    hw.set(LineId::MovingA, false);
    hw.set(LineId::MovingB, false);
    app.tick(&mut hw, &mut sink);
    hw.set(LineId::MovingA, true);
    hw.set(LineId::MovingB, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(sink.count_stuck(), 2);
}

// ── Operator commands ─────────────────────────────────────────

#[test]
fn operator_reset_returns_to_idle_with_gates_closed() {
    let (mut app, mut hw, mut sink) = default_app();

    hw.set(LineId::Front, true);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::FrontEntering);
    assert!(hw.gate_open(Gate::A));

    app.handle_command(AppCommand::OperatorReset, &mut hw, &mut sink);
    assert_eq!(app.state(), AirlockState::Idle);
    assert!(!hw.gate_open(Gate::A));
    assert!(!hw.gate_open(Gate::B));
}

#[test]
fn force_state_resynchronizes_traversal_direction() {
    let (mut app, mut hw, mut sink) = default_app();

    app.handle_command(
        AppCommand::ForceState(AirlockState::BackEntering),
        &mut hw,
        &mut sink,
    );
    assert_eq!(app.state(), AirlockState::BackEntering);
    assert!(hw.gate_open(Gate::B), "mirror direction opens gate B");
    assert!(!hw.gate_open(Gate::A));
}

// ── Telemetry cadence ─────────────────────────────────────────

#[test]
fn telemetry_emitted_at_configured_interval() {
    let config = AirlockConfig {
        telemetry_interval_cycles: 10,
        ..AirlockConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app(config);

    for _ in 0..25 {
        app.tick(&mut hw, &mut sink);
    }
    assert_eq!(sink.count_telemetry(), 2);
}

#[test]
fn telemetry_disabled_at_zero_interval() {
    let config = AirlockConfig {
        telemetry_interval_cycles: 0,
        ..AirlockConfig::default()
    };
    let (mut app, mut hw, mut sink) = make_app(config);

    for _ in 0..25 {
        app.tick(&mut hw, &mut sink);
    }
    assert_eq!(sink.count_telemetry(), 0);
}
