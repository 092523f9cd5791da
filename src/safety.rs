//! Safety arbiter.
//!
//! The arbiter runs **every cycle before the sequencer** and maintains a
//! lockout bitmask mirrored into `FsmContext.lockout`. The sequencer's
//! state handlers check this mask to decide whether to transition to
//! `SafetyLocked`; the service additionally force-closes both gates the
//! same cycle. The arbiter is a precondition gate, not a state in the
//! sequencer's machine.
//!
//! ## Lockout lifecycle
//!
//! 1. A condition triggers a lockout (e.g. gate A path obstructed).
//! 2. The arbiter sets the corresponding bit in the mask.
//! 3. The sequencer transitions to `SafetyLocked`; `locked_enter` forces
//!    both gates closed.
//! 4. Each cycle in `SafetyLocked`, the arbiter re-evaluates. If the
//!    condition clears, it unsets the bit.
//! 5. When the mask reaches zero, `locked_update` returns
//!    `Some(AirlockState::Idle)` — recovery within one cycle of clear.
//!
//! This approach supports **multiple simultaneous reasons**: the system
//! does not leave `SafetyLocked` until *every* reason is resolved. An
//! unreadable sensor line counts as a reason of its own (fail-closed).

use crate::error::LockoutReason;
use crate::fsm::context::SensorSnapshot;
use log::{error, info};

/// Snapshot of the active lockout reasons, returned while any is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lockout {
    mask: u8,
}

impl Lockout {
    /// Raw reason bitmask (never zero).
    pub const fn mask(self) -> u8 {
        self.mask
    }

    /// Whether a specific reason contributes to this lockout.
    pub const fn contains(self, reason: LockoutReason) -> bool {
        self.mask & reason.mask() != 0
    }
}

impl core::fmt::Display for Lockout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for reason in LockoutReason::ALL {
            if self.contains(reason) {
                if !first {
                    write!(f, " + ")?;
                }
                write!(f, "{reason}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Safety arbiter.
pub struct SafetyArbiter {
    /// Active lockout bitmask.
    mask: u8,
}

impl SafetyArbiter {
    pub fn new() -> Self {
        Self { mask: 0 }
    }

    /// Evaluate all safety conditions against the latest sensor snapshot.
    ///
    /// Returns `Some(Lockout)` while any reason is active — the caller
    /// must treat this as an unconditional veto on gate motion.
    pub fn check(&mut self, snap: &SensorSnapshot) -> Option<Lockout> {
        self.eval_reason(LockoutReason::GateAObstructed, snap.safety_a);
        self.eval_reason(LockoutReason::GateBObstructed, snap.safety_b);
        self.eval_reason(LockoutReason::SensorFault, snap.line_fault);

        if self.mask != 0 {
            Some(Lockout { mask: self.mask })
        } else {
            None
        }
    }

    /// Current lockout bitmask.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// True if **any** lockout reason is active.
    pub fn has_lockout(&self) -> bool {
        self.mask != 0
    }

    /// Check if a specific reason is active.
    pub fn has_reason(&self, reason: LockoutReason) -> bool {
        self.mask & reason.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a reason bit based on a boolean condition.
    fn eval_reason(&mut self, reason: LockoutReason, condition: bool) {
        if condition {
            if self.mask & reason.mask() == 0 {
                error!("LOCKOUT SET: {reason}");
            }
            self.mask |= reason.mask();
        } else {
            if self.mask & reason.mask() != 0 {
                info!("LOCKOUT CLEARED: {reason}");
            }
            self.mask &= !reason.mask();
        }
    }
}
