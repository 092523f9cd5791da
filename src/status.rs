//! Status reporter.
//!
//! Total pure mapping from sequencer state to the externally observable
//! indicator colour — one colour per state, no feedback into control.
//! `SafetyLocked` and the fault-flavoured `MiddleOccupied` report both map
//! to the alert colour, distinguishable from every nominal sequencing
//! colour; the display driver renders alert as a flash pattern.

use serde::Serialize;

use crate::fsm::AirlockState;

/// Indicator colour consumed by the external display driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusColor {
    /// System at rest, both gates closed.
    Green,
    /// Entry gate cycling.
    Amber,
    /// Agent sealed in the chamber.
    Blue,
    /// Exit gate cycling.
    Purple,
    /// Lockout in force.
    Alert,
}

/// Map a reported state to its indicator colour.
///
/// `lockout` carries the fault flavour: a `MiddleOccupied` report while a
/// lockout is in force means "agent trapped mid-chamber under fault" and
/// must alert, not show the nominal chamber colour.
pub fn status_color(state: AirlockState, lockout: bool) -> StatusColor {
    if lockout {
        return StatusColor::Alert;
    }
    match state {
        AirlockState::Idle => StatusColor::Green,
        AirlockState::FrontEntering | AirlockState::BackEntering => StatusColor::Amber,
        AirlockState::MiddleOccupied => StatusColor::Blue,
        AirlockState::BackExiting | AirlockState::FrontExiting => StatusColor::Purple,
        AirlockState::SafetyLocked => StatusColor::Alert,
    }
}
