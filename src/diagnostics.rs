//! Runtime diagnostics and the per-cycle trace channel.
//!
//! Counters and a bounded recent-transition history, collected on-demand
//! for telemetry and the simulation summary. The per-cycle trace is a
//! textual dump of every normalized sensor boolean plus the current
//! state, written to the debug log for an external logger to capture —
//! it is observability only, never part of the control contract.

use core::fmt::Write as _;

use heapless::{Deque, String};

use crate::fsm::AirlockState;
use crate::fsm::context::SensorSnapshot;

/// Transition history depth.
const HISTORY_SLOTS: usize = 16;

/// One recorded sequencer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    pub cycle: u64,
    pub from: AirlockState,
    pub to: AirlockState,
}

/// Accumulated runtime diagnostics.
#[derive(Default)]
pub struct CycleDiagnostics {
    /// Control cycles executed since startup.
    pub cycles: u64,
    /// Total sequencer transitions.
    pub transitions: u32,
    /// Open commands refused by the gateway.
    pub rejected_commands: u32,
    /// Lockout episodes entered.
    pub lockouts: u32,
    /// Stuck-transition diagnostics raised.
    pub stuck_events: u32,
    /// Most recent transitions, oldest first.
    history: Deque<TransitionRecord, HISTORY_SLOTS>,
}

impl CycleDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sequencer transition, evicting the oldest entry when the
    /// history ring is full.
    pub fn record_transition(&mut self, cycle: u64, from: AirlockState, to: AirlockState) {
        self.transitions = self.transitions.saturating_add(1);
        if self.history.is_full() {
            let _ = self.history.pop_front();
        }
        // Cannot fail: a slot was just freed if the ring was full.
        let _ = self.history.push_back(TransitionRecord { cycle, from, to });
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }
}

/// Format the per-cycle diagnostic line: every normalized boolean plus the
/// current state. Stack-allocated; the caller hands it to the logger.
pub fn cycle_trace(cycle: u64, snap: &SensorSnapshot, state: AirlockState) -> String<128> {
    let mut line = String::new();
    // Buffer is sized for the longest state name plus all flags; a
    // formatting overflow would only truncate the trace, never panic.
    let _ = write!(
        line,
        "cycle={cycle} f={} m={} b={} sA={} sB={} mvA={} mvB={} fault={} state={}",
        u8::from(snap.front),
        u8::from(snap.middle),
        u8::from(snap.back),
        u8::from(snap.safety_a),
        u8::from(snap.safety_b),
        u8::from(snap.moving_a),
        u8::from(snap.moving_b),
        u8::from(snap.line_fault),
        state.name(),
    );
    line
}
