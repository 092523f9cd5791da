//! Unified error types for the airlock controller.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling
//! uniform. All variants are `Copy` so they can be cheaply passed through the
//! safety arbiter and sequencer without allocation. No error is fatal: the
//! loop keeps running and re-evaluates every cycle, since an obstruction or
//! stall may clear on its own.

use core::fmt;

use crate::fsm::context::Gate;
use crate::sensors::LineId;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required sensor line could not be read.
    Sensor(SensorFault),
    /// The gate actuator gateway refused a command.
    Gate(Rejected),
    /// A safety lockout is in force.
    Safety(LockoutReason),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Gate(e) => write!(f, "gate: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// A digital sensor line could not be read.
///
/// Fail-closed policy: the sampler reports the affected snapshot with both
/// safety booleans asserted, so an unreadable line behaves exactly like a
/// physical obstruction until it recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault {
    /// The line that failed to read.
    pub line: LineId,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} unreadable", self.line)
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Gateway rejections
// ---------------------------------------------------------------------------

/// The gate actuator gateway refused an open command because the gate's own
/// safety line reports an obstruction.
///
/// A rejection reflects correct enforcement of an invariant, not a bug in
/// the caller — it is logged and surfaced as a diagnostic event, never
/// escalated. Close commands are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    /// The gate whose open command was refused.
    pub gate: Gate,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "open refused for gate {} (path obstructed)", self.gate)
    }
}

impl From<Rejected> for Error {
    fn from(e: Rejected) -> Self {
        Self::Gate(e)
    }
}

// ---------------------------------------------------------------------------
// Lockout reasons
// ---------------------------------------------------------------------------

/// Lockout reasons are a special category: any active reason forces both
/// gates closed and suspends sequencing. They are accumulated in a bitfield
/// by the safety arbiter so that multiple simultaneous reasons can be
/// tracked and individually cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LockoutReason {
    /// Gate A's path is obstructed.
    GateAObstructed = 0b0000_0001,
    /// Gate B's path is obstructed.
    GateBObstructed = 0b0000_0010,
    /// A sensor line is unreadable (fail-closed).
    SensorFault = 0b0000_0100,
}

impl LockoutReason {
    /// Return the bitmask for this reason.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// All reasons, for iteration in mask-decoding paths.
    pub const ALL: [Self; 3] = [Self::GateAObstructed, Self::GateBObstructed, Self::SensorFault];
}

impl fmt::Display for LockoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GateAObstructed => write!(f, "gate A obstructed"),
            Self::GateBObstructed => write!(f, "gate B obstructed"),
            Self::SensorFault => write!(f, "sensor line unreadable"),
        }
    }
}

impl From<LockoutReason> for Error {
    fn from(e: LockoutReason) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
