//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history — including whether any instant ever had both gates driven
//! open — without touching real lines.

use airlock::app::events::AppEvent;
use airlock::app::ports::{ActuatorPort, EventSink};
use airlock::error::SensorFault;
use airlock::fsm::context::Gate;
use airlock::sensors::{LineId, LineSource};
use airlock::status::StatusColor;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetGate { gate: Gate, open: bool },
    SetIndicator(StatusColor),
    AllClosed,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Raw line levels returned to the sampler.
    levels: [bool; LineId::COUNT],
    /// Lines currently failing to read.
    failing: [bool; LineId::COUNT],
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            levels: [false; LineId::COUNT],
            failing: [false; LineId::COUNT],
            calls: Vec::new(),
        }
    }

    pub fn set(&mut self, line: LineId, high: bool) {
        self.levels[line.index()] = high;
    }

    pub fn clear_lines(&mut self) {
        self.levels = [false; LineId::COUNT];
    }

    pub fn fail(&mut self, line: LineId, failing: bool) {
        self.failing[line.index()] = failing;
    }

    /// Level currently driven for one gate (closed until driven).
    pub fn gate_open(&self, gate: Gate) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetGate { gate: g, open } if *g == gate => Some(*open),
                ActuatorCall::AllClosed => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Replays the call history and reports whether both gates were ever
    /// driven open at the same instant.
    pub fn both_gates_ever_open(&self) -> bool {
        let mut open = [false; 2];
        for call in &self.calls {
            match call {
                ActuatorCall::SetGate { gate, open: o } => open[gate.index()] = *o,
                ActuatorCall::AllClosed => open = [false; 2],
                ActuatorCall::SetIndicator(_) => {}
            }
            if open[0] && open[1] {
                return true;
            }
        }
        false
    }

    /// Indicator most recently driven.
    pub fn indicator(&self) -> Option<StatusColor> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetIndicator(color) => Some(*color),
            _ => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for MockHardware {
    fn read_line(&mut self, line: LineId) -> Result<bool, SensorFault> {
        if self.failing[line.index()] {
            return Err(SensorFault { line });
        }
        Ok(self.levels[line.index()])
    }
}

impl ActuatorPort for MockHardware {
    fn set_gate(&mut self, gate: Gate, open: bool) {
        self.calls.push(ActuatorCall::SetGate { gate, open });
    }

    fn set_indicator(&mut self, color: StatusColor) {
        self.calls.push(ActuatorCall::SetIndicator(color));
    }

    fn all_closed(&mut self) {
        self.calls.push(ActuatorCall::AllClosed);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count_rejections(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::CommandRejected { .. }))
            .count()
    }

    pub fn count_stuck(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::StuckTransition { .. }))
            .count()
    }

    pub fn count_telemetry(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn saw_lockout_entered(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, AppEvent::LockoutEntered(_)))
    }

    pub fn saw_lockout_cleared(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, AppEvent::LockoutCleared))
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
