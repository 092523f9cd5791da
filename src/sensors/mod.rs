//! Sensor subsystem — line identities, the raw-line boundary, and the
//! aggregating [`SensorHub`].
//!
//! The hub owns the per-line debounce state and produces a
//! [`SensorSnapshot`] each cycle that gets written into
//! `FsmContext.snapshot`. It normalizes polarity, applies the optional
//! debounce, and nothing else — control decisions live upstream.
//!
//! Fail-closed: if any line cannot be read, the snapshot is published
//! with `line_fault` set and both safety booleans forced true, so an
//! unreadable harness behaves exactly like an obstruction until it
//! recovers.

pub mod debounce;

use log::error;

use crate::config::AirlockConfig;
use crate::error::SensorFault;
use crate::fsm::context::SensorSnapshot;
use debounce::{DebouncedLine, LinePolicy};

// ---------------------------------------------------------------------------
// Line identities
// ---------------------------------------------------------------------------

/// Every digital line the controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineId {
    /// Front presence zone beam-break.
    Front,
    /// Middle (chamber) presence zone beam-break.
    Middle,
    /// Back presence zone beam-break.
    Back,
    /// Gate A safety-obstruction detector.
    SafetyA,
    /// Gate B safety-obstruction detector.
    SafetyB,
    /// Gate A motion-in-progress feedback.
    MovingA,
    /// Gate B motion-in-progress feedback.
    MovingB,
}

impl LineId {
    /// Number of lines — sizes the per-line state arrays.
    pub const COUNT: usize = 7;

    /// All lines, in snapshot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Front,
        Self::Middle,
        Self::Back,
        Self::SafetyA,
        Self::SafetyB,
        Self::MovingA,
        Self::MovingB,
    ];

    /// Array index for per-line storage.
    pub const fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Middle => 1,
            Self::Back => 2,
            Self::SafetyA => 3,
            Self::SafetyB => 4,
            Self::MovingA => 5,
            Self::MovingB => 6,
        }
    }
}

impl core::fmt::Display for LineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Front => "front",
            Self::Middle => "middle",
            Self::Back => "back",
            Self::SafetyA => "safety-A",
            Self::SafetyB => "safety-B",
            Self::MovingA => "moving-A",
            Self::MovingB => "moving-B",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Raw-line boundary
// ---------------------------------------------------------------------------

/// Read-side boundary to the physical lines. Adapters implement this over
/// real GPIO (via `embedded-hal` pins) or the in-memory simulation.
pub trait LineSource {
    /// Raw electrical level of one line (`true` = high).
    fn read_line(&mut self, line: LineId) -> Result<bool, SensorFault>;
}

// ---------------------------------------------------------------------------
// SensorHub
// ---------------------------------------------------------------------------

/// Aggregates the seven digital lines into a unified per-cycle snapshot.
pub struct SensorHub {
    lines: [DebouncedLine; LineId::COUNT],
    policy: LinePolicy,
    debounce_cycles: u8,
}

impl SensorHub {
    /// Construct a hub with the deployment's line policy.
    pub fn new(config: &AirlockConfig) -> Self {
        Self {
            lines: [DebouncedLine::new(); LineId::COUNT],
            policy: config.line_policy,
            debounce_cycles: config.debounce_cycles,
        }
    }

    /// Adopt a changed line policy (runtime config update).
    pub fn reconfigure(&mut self, config: &AirlockConfig) {
        self.policy = config.line_policy;
        self.debounce_cycles = config.debounce_cycles;
    }

    /// Read every line and return a unified snapshot.
    ///
    /// A line that fails to read keeps its previous logical value, and the
    /// snapshot is flagged fail-closed: `line_fault` set, both safety
    /// booleans forced true. A single flaky line must not crash the loop.
    pub fn sample(&mut self, source: &mut impl LineSource) -> SensorSnapshot {
        let mut logical = [false; LineId::COUNT];
        let mut fault = false;

        for id in LineId::ALL {
            let slot = &mut self.lines[id.index()];
            match source.read_line(id) {
                Ok(raw) => {
                    logical[id.index()] = slot.update(raw, self.policy, self.debounce_cycles);
                }
                Err(e) => {
                    error!("SENSOR FAULT: {e}");
                    fault = true;
                    logical[id.index()] = slot.value();
                }
            }
        }

        let mut snap = SensorSnapshot {
            front: logical[LineId::Front.index()],
            middle: logical[LineId::Middle.index()],
            back: logical[LineId::Back.index()],
            safety_a: logical[LineId::SafetyA.index()],
            safety_b: logical[LineId::SafetyB.index()],
            moving_a: logical[LineId::MovingA.index()],
            moving_b: logical[LineId::MovingB.index()],
            line_fault: fault,
        };

        if fault {
            snap.safety_a = true;
            snap.safety_b = true;
        }

        snap
    }
}
