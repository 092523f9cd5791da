//! Shared mutable context threaded through every sequencer handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to. It contains the latest sensor snapshot, the gate command
//! outputs, timing information, configuration, the active lockout mask,
//! and the traversal descriptor for the passage in progress.

use crate::config::AirlockConfig;
use crate::status::StatusColor;

// ---------------------------------------------------------------------------
// Gates and zones
// ---------------------------------------------------------------------------

/// One of the two physical gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    A,
    B,
}

impl Gate {
    /// The opposite gate.
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Array index for per-gate storage.
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl core::fmt::Display for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// One of the three presence zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Front,
    Middle,
    Back,
}

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the sampler)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every normalized sensor boolean, produced
/// once per control cycle. Never mutated, only superseded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Front presence zone occupied.
    pub front: bool,
    /// Middle (chamber) presence zone occupied.
    pub middle: bool,
    /// Back presence zone occupied.
    pub back: bool,

    /// Gate A's path is obstructed (must block motion).
    pub safety_a: bool,
    /// Gate B's path is obstructed (must block motion).
    pub safety_b: bool,

    /// Gate A is in transit (not yet settled open or closed).
    pub moving_a: bool,
    /// Gate B is in transit.
    pub moving_b: bool,

    /// One or more lines could not be read this cycle. When set, the
    /// sampler has already forced both safety booleans (fail-closed).
    pub line_fault: bool,
}

impl SensorSnapshot {
    /// Occupancy of the given zone.
    pub const fn zone(&self, zone: Zone) -> bool {
        match zone {
            Zone::Front => self.front,
            Zone::Middle => self.middle,
            Zone::Back => self.back,
        }
    }

    /// Obstruction state of the given gate's safety line.
    pub const fn safety(&self, gate: Gate) -> bool {
        match gate {
            Gate::A => self.safety_a,
            Gate::B => self.safety_b,
        }
    }

    /// Motion state of the given gate.
    pub const fn moving(&self, gate: Gate) -> bool {
        match gate {
            Gate::A => self.moving_a,
            Gate::B => self.moving_b,
        }
    }
}

// ---------------------------------------------------------------------------
// Gate commands (written by state handlers; consumed via the gateway)
// ---------------------------------------------------------------------------

/// Desired actuator levels for the current cycle. State handlers write the
/// gate levels; the service writes the indicator from the status reporter.
/// Applied to hardware through the gate gateway after every sequencer tick.
#[derive(Debug, Clone, Copy)]
pub struct GateCommands {
    /// Gate A open-request level (held until changed).
    pub open_a: bool,
    /// Gate B open-request level.
    pub open_b: bool,
    /// Status indicator colour for the external display driver.
    pub indicator: StatusColor,
}

impl Default for GateCommands {
    fn default() -> Self {
        Self {
            open_a: false,
            open_b: false,
            indicator: StatusColor::Green,
        }
    }
}

impl GateCommands {
    /// Both gates closed — safe default.
    pub fn all_closed() -> Self {
        Self::default()
    }

    /// Set the desired level for one gate.
    pub fn set_open(&mut self, gate: Gate, open: bool) {
        match gate {
            Gate::A => self.open_a = open,
            Gate::B => self.open_b = open,
        }
    }

    /// Desired level for one gate.
    pub const fn is_open(&self, gate: Gate) -> bool {
        match gate {
            Gate::A => self.open_a,
            Gate::B => self.open_b,
        }
    }
}

// ---------------------------------------------------------------------------
// Passage descriptor
// ---------------------------------------------------------------------------

/// Role assignment for one traversal direction.
///
/// The two directions through the chamber are structural mirrors; a single
/// parameterized handler set runs both, with this descriptor supplying the
/// gate and zone roles. Instantiated exactly twice, as
/// [`Passage::FRONT_TO_BACK`] and [`Passage::BACK_TO_FRONT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passage {
    /// Gate the agent enters through.
    pub entry_gate: Gate,
    /// Gate the agent leaves through.
    pub exit_gate: Gate,
    /// Zone the agent arrives from.
    pub entry_zone: Zone,
    /// Zone the agent departs into.
    pub exit_zone: Zone,
}

impl Passage {
    /// Front-zone entry: in through gate A, out through gate B.
    pub const FRONT_TO_BACK: Self = Self {
        entry_gate: Gate::A,
        exit_gate: Gate::B,
        entry_zone: Zone::Front,
        exit_zone: Zone::Back,
    };

    /// Back-zone entry: the mirror traversal, in through gate B.
    pub const BACK_TO_FRONT: Self = Self {
        entry_gate: Gate::B,
        exit_gate: Gate::A,
        entry_zone: Zone::Back,
        exit_zone: Zone::Front,
    };
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Cycles elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total cycle count.
    pub total_ticks: u64,

    // -- Sensor data --
    /// Latest normalized snapshot. Updated before each sequencer tick.
    pub snapshot: SensorSnapshot,

    // -- Actuator outputs --
    /// Commands to be applied through the gateway after the tick.
    pub commands: GateCommands,

    // -- Configuration --
    /// System configuration (tunable parameters).
    pub config: AirlockConfig,

    // -- Safety --
    /// Active lockout bitmask (see `LockoutReason::mask()`).
    /// Set by the safety arbiter, read by state handlers.
    pub lockout: u8,

    // -- Traversal --
    /// Role assignment for the passage in progress. Written by the Idle
    /// handler when a traversal starts; read by the shared direction
    /// handlers. Meaningless while Idle or SafetyLocked.
    pub passage: Passage,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: AirlockConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            snapshot: SensorSnapshot::default(),
            commands: GateCommands::all_closed(),
            config,
            lockout: 0,
            passage: Passage::FRONT_TO_BACK,
        }
    }

    /// Returns `true` if **any** lockout reason is active.
    pub fn has_lockout(&self) -> bool {
        self.lockout != 0
    }

    /// Check whether a specific lockout reason is set.
    pub fn has_reason(&self, reason: crate::error::LockoutReason) -> bool {
        self.lockout & reason.mask() != 0
    }
}
