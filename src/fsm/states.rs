//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap. This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  IDLE ──[front]──▶ FRONT_ENTERING ──[A settled, middle]──▶ MIDDLE_OCCUPIED
//!    ▲                                                            │
//!    │                                                   [A fully closed]
//!    │                                                            ▼
//!    └─────[B settled, back clear]────────────────────────  BACK_EXITING
//!
//!  IDLE ──[back]──▶ BACK_ENTERING ─▶ MIDDLE_OCCUPIED ─▶ FRONT_EXITING ─▶ IDLE
//!  (mirror traversal: same handlers, gate/zone roles swapped via Passage)
//!
//!  Any state ──[lockout]──▶ SAFETY_LOCKED ──[lockout cleared]──▶ IDLE
//! ```
//!
//! The two traversal directions run the **same** handler functions,
//! parameterized by the [`Passage`] descriptor the Idle handler writes
//! into the context. The mirrored table rows differ only in identity.
//! Front-zone entry is prioritized over back-zone entry when both zones
//! are occupied at Idle — a documented design choice, not incidental.

use super::context::{FsmContext, GateCommands, Passage};
use super::{AirlockState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; AirlockState::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: AirlockState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — FrontEntering (entry half of the A→B traversal)
        StateDescriptor {
            id: AirlockState::FrontEntering,
            name: "FrontEntering",
            on_enter: Some(entering_enter),
            on_exit: None,
            on_update: entering_update,
        },
        // Index 2 — MiddleOccupied (shared by both traversal directions)
        StateDescriptor {
            id: AirlockState::MiddleOccupied,
            name: "MiddleOccupied",
            on_enter: Some(middle_enter),
            on_exit: None,
            on_update: middle_update,
        },
        // Index 3 — BackExiting (exit half of the A→B traversal)
        StateDescriptor {
            id: AirlockState::BackExiting,
            name: "BackExiting",
            on_enter: Some(exiting_enter),
            on_exit: None,
            on_update: exiting_update,
        },
        // Index 4 — BackEntering (mirror of FrontEntering, same handlers)
        StateDescriptor {
            id: AirlockState::BackEntering,
            name: "BackEntering",
            on_enter: Some(entering_enter),
            on_exit: None,
            on_update: entering_update,
        },
        // Index 5 — FrontExiting (mirror of BackExiting, same handlers)
        StateDescriptor {
            id: AirlockState::FrontExiting,
            name: "FrontExiting",
            on_enter: Some(exiting_enter),
            on_exit: None,
            on_update: exiting_update,
        },
        // Index 6 — SafetyLocked
        StateDescriptor {
            id: AirlockState::SafetyLocked,
            name: "SafetyLocked",
            on_enter: Some(locked_enter),
            on_exit: Some(locked_exit),
            on_update: locked_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    // Both gates closed, chamber at rest.
    let indicator = ctx.commands.indicator;
    ctx.commands = GateCommands::all_closed();
    ctx.commands.indicator = indicator;
    info!("IDLE: both gates closed, monitoring presence zones");
}

fn idle_update(ctx: &mut FsmContext) -> Option<AirlockState> {
    // Guard: any lockout → SafetyLocked
    if ctx.has_lockout() {
        return Some(AirlockState::SafetyLocked);
    }

    let snap = &ctx.snapshot;

    // Occupied chamber with no traversal in progress: hold until it clears.
    if snap.middle {
        return None;
    }

    // Front-zone entry wins the tie when both approach zones are occupied.
    if snap.front {
        ctx.passage = Passage::FRONT_TO_BACK;
        return Some(AirlockState::FrontEntering);
    }
    if snap.back {
        ctx.passage = Passage::BACK_TO_FRONT;
        return Some(AirlockState::BackEntering);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ENTERING states — entry gate open, waiting for the agent to reach the
//  chamber (shared by FrontEntering and BackEntering)
// ═══════════════════════════════════════════════════════════════════════════

fn entering_enter(ctx: &mut FsmContext) {
    let entry = ctx.passage.entry_gate;
    // The exit gate must be commanded closed before the entry gate may
    // open — holds even when this state is entered by force.
    ctx.commands.set_open(ctx.passage.exit_gate, false);
    ctx.commands.set_open(entry, true);
    info!(
        "ENTERING: gate {} commanded open from {:?} zone",
        entry, ctx.passage.entry_zone
    );
}

fn entering_update(ctx: &mut FsmContext) -> Option<AirlockState> {
    if ctx.has_lockout() {
        return Some(AirlockState::SafetyLocked);
    }

    let entry = ctx.passage.entry_gate;

    // Entry gate settled open and the agent has reached the chamber →
    // seal it in. If the agent never arrives the gate holds open; the
    // stuck-transition watchpoint surfaces that to the operator.
    if !ctx.snapshot.moving(entry) && ctx.snapshot.middle {
        return Some(AirlockState::MiddleOccupied);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MIDDLE_OCCUPIED state — agent inside, both gates commanded closed
// ═══════════════════════════════════════════════════════════════════════════

fn middle_enter(ctx: &mut FsmContext) {
    let entry = ctx.passage.entry_gate;
    ctx.commands.set_open(entry, false);
    info!("MIDDLE: agent in chamber, gate {} closing", entry);
}

fn middle_update(ctx: &mut FsmContext) -> Option<AirlockState> {
    if ctx.has_lockout() {
        return Some(AirlockState::SafetyLocked);
    }

    // The exit gate may not open until the entry gate has fully closed —
    // this ordering carries the mutual-exclusion invariant across the
    // handoff between the two gates.
    if !ctx.snapshot.moving(ctx.passage.entry_gate) {
        return Some(exiting_state_for(ctx.passage));
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXITING states — exit gate open, waiting for the agent to leave
//  (shared by BackExiting and FrontExiting)
// ═══════════════════════════════════════════════════════════════════════════

fn exiting_enter(ctx: &mut FsmContext) {
    let exit = ctx.passage.exit_gate;
    // Mirror of entering_enter: entry gate commanded closed first.
    ctx.commands.set_open(ctx.passage.entry_gate, false);
    ctx.commands.set_open(exit, true);
    info!(
        "EXITING: gate {} commanded open toward {:?} zone",
        exit, ctx.passage.exit_zone
    );
}

fn exiting_update(ctx: &mut FsmContext) -> Option<AirlockState> {
    if ctx.has_lockout() {
        return Some(AirlockState::SafetyLocked);
    }

    let exit = ctx.passage.exit_gate;

    // Exit gate settled open and the departure zone is clear → traversal
    // complete, close up behind the agent.
    if !ctx.snapshot.moving(exit) && !ctx.snapshot.zone(ctx.passage.exit_zone) {
        return Some(AirlockState::Idle);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFETY_LOCKED state — lockout in force, all sequencing suspended
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut FsmContext) {
    // Force both gates closed immediately.
    let indicator = ctx.commands.indicator;
    ctx.commands = GateCommands::all_closed();
    ctx.commands.indicator = indicator;
    warn!(
        "SAFETY LOCKED: both gates forced closed, lockout=0b{:08b}",
        ctx.lockout
    );
}

fn locked_exit(_ctx: &mut FsmContext) {
    info!("SAFETY LOCKED: lockout cleared, resuming from Idle");
}

fn locked_update(ctx: &mut FsmContext) -> Option<AirlockState> {
    // Stay locked until ALL lockout reasons are cleared.
    if !ctx.has_lockout() {
        return Some(AirlockState::Idle);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

/// The exiting state identity for a traversal direction.
fn exiting_state_for(passage: Passage) -> AirlockState {
    if passage == Passage::FRONT_TO_BACK {
        AirlockState::BackExiting
    } else {
        AirlockState::FrontExiting
    }
}

/// The canonical passage for states with a fixed direction, used to
/// resynchronize the context when a state is forced externally.
pub fn passage_for(state: AirlockState) -> Option<Passage> {
    match state {
        AirlockState::FrontEntering | AirlockState::BackExiting => Some(Passage::FRONT_TO_BACK),
        AirlockState::BackEntering | AirlockState::FrontExiting => Some(Passage::BACK_TO_FRONT),
        _ => None,
    }
}
