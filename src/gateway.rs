//! Gate actuator gateway.
//!
//! The sole path through which a gate command reaches the actuator port.
//! The gateway refuses any open request for a gate whose own safety line
//! currently reports an obstruction, regardless of caller — a second,
//! independent enforcement point for the invariant the safety arbiter
//! enforces one layer up. Even a sequencer bug that tries to open an
//! obstructed gate is stopped here. Close requests are never rejected.
//!
//! A rejection is a correct outcome, not a failure: callers log it and
//! carry on; the output level simply does not change.

use log::warn;

use crate::app::ports::ActuatorPort;
use crate::error::Rejected;
use crate::fsm::context::{Gate, SensorSnapshot};

/// Gateway between gate commands and the actuator port.
///
/// Holds the last level driven for each gate so rejected requests leave
/// the output untouched and callers can observe what is actually
/// commanded at the hardware boundary.
pub struct GateGateway {
    /// Levels currently driven, indexed by `Gate::index()`.
    driven: [bool; 2],
    /// Total open requests refused since startup.
    rejected: u32,
}

impl GateGateway {
    /// Both outputs start closed.
    pub fn new() -> Self {
        Self {
            driven: [false, false],
            rejected: 0,
        }
    }

    /// Drive one gate to the requested level.
    ///
    /// An `open = true` request is refused with [`Rejected`] while the
    /// gate's safety line reports an obstruction; the output is left
    /// unchanged. `open = false` always succeeds.
    pub fn command(
        &mut self,
        gate: Gate,
        open: bool,
        snap: &SensorSnapshot,
        hw: &mut impl ActuatorPort,
    ) -> Result<(), Rejected> {
        if open && snap.safety(gate) {
            self.rejected = self.rejected.saturating_add(1);
            warn!("GATEWAY: open refused for gate {gate} (path obstructed)");
            return Err(Rejected { gate });
        }

        // Mutual exclusion is the sequencer's invariant; a violation
        // reaching this point is a sequencing bug.
        debug_assert!(
            !(open && self.driven[gate.other().index()]),
            "both gates commanded open"
        );

        self.driven[gate.index()] = open;
        hw.set_gate(gate, open);
        Ok(())
    }

    /// Drive both gates closed. Never fails — close is never rejected.
    pub fn close_all(&mut self, snap: &SensorSnapshot, hw: &mut impl ActuatorPort) {
        // Close commands cannot be rejected; the Results are vacuously Ok.
        let _ = self.command(Gate::A, false, snap, hw);
        let _ = self.command(Gate::B, false, snap, hw);
    }

    /// Level currently driven for one gate.
    pub const fn is_open(&self, gate: Gate) -> bool {
        self.driven[gate.index()]
    }

    /// Total refused open requests since startup.
    pub const fn rejected_count(&self) -> u32 {
        self.rejected
    }
}
