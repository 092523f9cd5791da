//! Outbound application events.
//!
//! The [`AirlockService`](super::service::AirlockService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to the console, feed
//! a display driver, record for test assertions.

use serde::Serialize;

use crate::fsm::AirlockState;
use crate::fsm::context::Gate;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(AirlockState),

    /// The sequencer transitioned between states.
    StateChanged {
        from: AirlockState,
        to: AirlockState,
    },

    /// One or more lockout reasons became active (bitmask).
    LockoutEntered(u8),

    /// All lockout reasons have cleared.
    LockoutCleared,

    /// The gateway refused an open command. Correct enforcement of an
    /// invariant — surfaced for observability, never escalated.
    CommandRejected { gate: Gate },

    /// No sequencing progress for the configured number of cycles, or an
    /// impossible motion-feedback combination. The machine holds position
    /// until sensors normalize or an operator resets it.
    StuckTransition { state: AirlockState, cycles: u64 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub cycle: u64,
    /// Externally reported state name (fault flavour already applied).
    pub state: &'static str,
    pub front: bool,
    pub middle: bool,
    pub back: bool,
    pub gate_a_open: bool,
    pub gate_b_open: bool,
    pub lockout_mask: u8,
    pub rejected_commands: u32,
}
