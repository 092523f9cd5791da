//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! console, serial diagnostics, test harness) that the
//! [`AirlockService`](super::service::AirlockService) interprets and acts
//! upon. None of them can override an active lockout: the safety arbiter
//! re-asserts its veto every cycle.

use crate::config::AirlockConfig;
use crate::fsm::AirlockState;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Operator-level reset: return the sequencer to `Idle` with both
    /// gates closed (e.g. after a stuck-transition diagnostic).
    OperatorReset,

    /// Force the sequencer into a specific state (debug / testing only).
    ForceState(AirlockState),

    /// Hot-reload configuration. Rejected values are discarded.
    UpdateConfig(AirlockConfig),
}
