//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateTable                                                   │
//! │  ┌────────────────┬───────────┬──────────┬───────────────────┐│
//! │  │ AirlockState   │ on_enter  │ on_exit  │ on_update         ││
//! │  ├────────────────┼───────────┼──────────┼───────────────────┤│
//! │  │ Idle           │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ FrontEntering  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ MiddleOccupied │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> ││
//! │  │ ...            │           │          │                   ││
//! │  └────────────────┴───────────┴──────────┴───────────────────┘│
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each cycle the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.
//! All functions receive `&mut FsmContext` which holds the sensor
//! snapshot, gate commands, config, and timing. The mirrored traversal
//! directions bind the same handler functions, parameterized by the
//! `Passage` descriptor in the context.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible sequencer states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AirlockState {
    Idle = 0,
    FrontEntering = 1,
    MiddleOccupied = 2,
    BackExiting = 3,
    BackEntering = 4,
    FrontExiting = 5,
    SafetyLocked = 6,
}

impl AirlockState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 7;

    /// Convert a `u8` index back to `AirlockState`. Panics on out-of-range
    /// in debug builds; returns `SafetyLocked` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::FrontEntering,
            2 => Self::MiddleOccupied,
            3 => Self::BackExiting,
            4 => Self::BackEntering,
            5 => Self::FrontExiting,
            6 => Self::SafetyLocked,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::SafetyLocked
            }
        }
    }

    /// Human-readable state name (matches the table entry).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::FrontEntering => "FrontEntering",
            Self::MiddleOccupied => "MiddleOccupied",
            Self::BackExiting => "BackExiting",
            Self::BackEntering => "BackEntering",
            Self::FrontExiting => "FrontExiting",
            Self::SafetyLocked => "SafetyLocked",
        }
    }

    /// A gate is commanded or in transit in this state — the states in
    /// which lack of progress is abnormal and worth a stuck diagnostic.
    pub const fn is_transit(self) -> bool {
        matches!(
            self,
            Self::FrontEntering
                | Self::MiddleOccupied
                | Self::BackExiting
                | Self::BackEntering
                | Self::FrontExiting
        )
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-cycle update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<AirlockState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single sequencer state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: AirlockState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and advances a
/// mutable [`FsmContext`] that is threaded through every handler call.
/// `AirlockState` is the single source of truth for "what should happen
/// next"; it is mutated only here, once per cycle.
pub struct Fsm {
    /// Fixed-size table indexed by `AirlockState as usize`.
    table: [StateDescriptor; AirlockState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing cycle counter (wraps at u64::MAX).
    tick_count: u64,
    /// Cycle at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; AirlockState::COUNT], initial: AirlockState) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one cycle.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    /// 3. Increment the cycle counter.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (used by the safety arbiter to jump
    /// to `SafetyLocked` regardless of what `on_update` returned).
    pub fn force_transition(&mut self, next: AirlockState, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> AirlockState {
        AirlockState::from_index(self.current)
    }

    /// How many cycles the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: AirlockState, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer and timing
        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
