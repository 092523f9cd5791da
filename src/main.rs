//! Airlock controller — simulation entry point.
//!
//! Wires the control core to the in-memory plant and runs scripted
//! scenarios at the fixed control period: a front-to-back traversal, the
//! mirror back-to-front traversal, an obstruction during gate motion,
//! and a sensor-line failure. The control loop is a strict synchronous
//! tick — sample, arbitrate, sequence, actuate — with nothing blocking
//! inside the tick body; a deployment replaces the sleep pacing with its
//! platform timer and the sim adapter with its GPIO adapter.

use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use log::info;

use airlock::adapters::log_sink::LogEventSink;
use airlock::adapters::sim::SimHardware;
use airlock::app::service::AirlockService;
use airlock::config::AirlockConfig;
use airlock::fsm::AirlockState;
use airlock::fsm::context::Gate;
use airlock::sensors::LineId;

/// Cycles a gate takes to open or close in the simulated plant.
const GATE_TRAVEL_CYCLES: u32 = 3;

/// Give up on a scenario after this many cycles.
const SCENARIO_TIMEOUT_CYCLES: u32 = 300;

// ── Scripted agent ────────────────────────────────────────────
//
// A cooperative agent that follows the gates: it waits at the entry
// zone, steps into the chamber once the entry gate is physically open,
// steps out once the exit gate is open, and clears the exit zone two
// cycles later.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentLocation {
    EntryZone,
    Chamber,
    ExitZone { cycles_left: u8 },
    Away,
}

struct Agent {
    location: AgentLocation,
    entry_line: LineId,
    exit_line: LineId,
    entry_gate: Gate,
    exit_gate: Gate,
}

impl Agent {
    fn entering_from_front() -> Self {
        Self {
            location: AgentLocation::EntryZone,
            entry_line: LineId::Front,
            exit_line: LineId::Back,
            entry_gate: Gate::A,
            exit_gate: Gate::B,
        }
    }

    fn entering_from_back() -> Self {
        Self {
            location: AgentLocation::EntryZone,
            entry_line: LineId::Back,
            exit_line: LineId::Front,
            entry_gate: Gate::B,
            exit_gate: Gate::A,
        }
    }

    /// Move the agent one step and update the presence lines.
    fn advance(&mut self, hw: &mut SimHardware) {
        self.location = match self.location {
            AgentLocation::EntryZone => {
                hw.set_line(self.entry_line, true);
                if hw.gate_position(self.entry_gate) {
                    hw.set_line(self.entry_line, false);
                    hw.set_line(LineId::Middle, true);
                    AgentLocation::Chamber
                } else {
                    AgentLocation::EntryZone
                }
            }
            AgentLocation::Chamber => {
                if hw.gate_position(self.exit_gate) {
                    hw.set_line(LineId::Middle, false);
                    hw.set_line(self.exit_line, true);
                    AgentLocation::ExitZone { cycles_left: 2 }
                } else {
                    AgentLocation::Chamber
                }
            }
            AgentLocation::ExitZone { cycles_left } => {
                if cycles_left == 0 {
                    hw.set_line(self.exit_line, false);
                    AgentLocation::Away
                } else {
                    AgentLocation::ExitZone {
                        cycles_left: cycles_left - 1,
                    }
                }
            }
            AgentLocation::Away => AgentLocation::Away,
        };
    }
}

// ── Scenarios ─────────────────────────────────────────────────

fn run_cycle(
    app: &mut AirlockService,
    hw: &mut SimHardware,
    sink: &mut LogEventSink,
    period: Duration,
) {
    app.tick(hw, sink);
    hw.step();
    thread::sleep(period);
}

/// Drive one full traversal until the sequencer is back at Idle.
fn run_traversal(
    app: &mut AirlockService,
    hw: &mut SimHardware,
    sink: &mut LogEventSink,
    period: Duration,
    mut agent: Agent,
    label: &str,
) -> Result<()> {
    info!("── scenario: {label} ──");
    for _ in 0..SCENARIO_TIMEOUT_CYCLES {
        agent.advance(hw);
        run_cycle(app, hw, sink, period);
        if agent.location == AgentLocation::Away && app.state() == AirlockState::Idle {
            info!("── {label}: traversal complete ──");
            return Ok(());
        }
    }
    bail!("{label}: no progress after {SCENARIO_TIMEOUT_CYCLES} cycles");
}

/// Obstruct gate A mid-sequence, observe the lockout, then clear it.
fn run_obstruction(
    app: &mut AirlockService,
    hw: &mut SimHardware,
    sink: &mut LogEventSink,
    period: Duration,
) -> Result<()> {
    info!("── scenario: obstruction during entry ──");
    hw.set_line(LineId::Front, true);
    run_cycle(app, hw, sink, period);

    hw.set_line(LineId::SafetyA, true);
    run_cycle(app, hw, sink, period);
    if app.state() != AirlockState::SafetyLocked {
        bail!("obstruction did not force a lockout");
    }

    for _ in 0..5 {
        run_cycle(app, hw, sink, period);
    }

    hw.set_line(LineId::SafetyA, false);
    hw.set_line(LineId::Front, false);
    run_cycle(app, hw, sink, period);
    if app.state() != AirlockState::Idle {
        bail!("lockout did not clear back to Idle");
    }
    info!("── obstruction: recovered ──");
    Ok(())
}

/// Fail a sensor line, observe the fail-closed lockout, then restore it.
fn run_line_fault(
    app: &mut AirlockService,
    hw: &mut SimHardware,
    sink: &mut LogEventSink,
    period: Duration,
) -> Result<()> {
    info!("── scenario: unreadable sensor line ──");
    hw.fail_line(LineId::MovingB, true);
    run_cycle(app, hw, sink, period);
    if app.state() != AirlockState::SafetyLocked {
        bail!("sensor fault did not fail closed");
    }

    hw.fail_line(LineId::MovingB, false);
    run_cycle(app, hw, sink, period);
    if app.state() != AirlockState::Idle {
        bail!("sensor fault did not clear back to Idle");
    }
    info!("── line fault: recovered ──");
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Airlock controller sim v{}        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = AirlockConfig::default();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    let period = Duration::from_millis(u64::from(config.cycle_period_ms));

    let mut hw = SimHardware::with_travel_cycles(GATE_TRAVEL_CYCLES);
    let mut sink = LogEventSink::new();
    let mut app = AirlockService::new(config);
    app.start(&mut hw, &mut sink);

    run_traversal(
        &mut app,
        &mut hw,
        &mut sink,
        period,
        Agent::entering_from_front(),
        "front entry",
    )?;
    run_traversal(
        &mut app,
        &mut hw,
        &mut sink,
        period,
        Agent::entering_from_back(),
        "back entry",
    )?;
    run_obstruction(&mut app, &mut hw, &mut sink, period)?;
    run_line_fault(&mut app, &mut hw, &mut sink, period)?;

    let summary = serde_json::to_string_pretty(&app.build_telemetry())?;
    info!("final telemetry: {summary}");
    info!(
        "cycles={} transitions={} lockouts={} rejected={} stuck={}",
        app.diagnostics().cycles,
        app.diagnostics().transitions,
        app.diagnostics().lockouts,
        app.diagnostics().rejected_commands,
        app.diagnostics().stuck_events,
    );

    Ok(())
}
