//! Application service — the hexagonal core.
//!
//! [`AirlockService`] owns the sequencer, sampler, safety arbiter, and
//! gate gateway. It exposes a clean, hardware-agnostic API. All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   LineSource ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                  │        AirlockService        │
//!  ActuatorPort ◀──│ Sampler · Arbiter · FSM ·    │
//!                  │ Gateway · Status             │
//!                  └──────────────────────────────┘
//! ```
//!
//! Each control cycle is strictly ordered and completes synchronously:
//! sample → safety check → sequencing decision → actuation → status.
//! Nothing blocks inside a cycle; gate settling is observed via the
//! polled motion lines across cycles.

use log::{debug, info, warn};

use crate::config::AirlockConfig;
use crate::diagnostics::{self, CycleDiagnostics};
use crate::fsm::context::{FsmContext, Gate};
use crate::fsm::states::{build_state_table, passage_for};
use crate::fsm::{AirlockState, Fsm};
use crate::gateway::GateGateway;
use crate::safety::SafetyArbiter;
use crate::sensors::{LineSource, SensorHub};
use crate::status::status_color;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink};

// ───────────────────────────────────────────────────────────────
// AirlockService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AirlockService {
    fsm: Fsm,
    ctx: FsmContext,
    sampler: SensorHub,
    arbiter: SafetyArbiter,
    gateway: GateGateway,
    diagnostics: CycleDiagnostics,
    cycle: u64,
    /// Lockout level from the previous cycle, for edge events.
    was_lockout: bool,
    /// Latches the impossible both-gates-moving report so the diagnostic
    /// fires once per episode, not once per cycle.
    motion_anomaly_latched: bool,
}

impl AirlockService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the sequencer — call [`Self::start`] next.
    pub fn new(config: AirlockConfig) -> Self {
        let sampler = SensorHub::new(&config);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), AirlockState::Idle);

        Self {
            fsm,
            ctx,
            sampler,
            arbiter: SafetyArbiter::new(),
            gateway: GateGateway::new(),
            diagnostics: CycleDiagnostics::new(),
            cycle: 0,
            was_lockout: false,
            motion_anomaly_latched: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the sequencer in `Idle` with both gates commanded closed.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        hw.all_closed();
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AirlockService started in {:?}", self.fsm.current_state());
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle: sample → safety → sequencer → gateway
    /// actuation → status.
    ///
    /// The `hw` parameter satisfies **both** [`LineSource`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl LineSource + ActuatorPort), sink: &mut impl EventSink) {
        self.cycle += 1;
        self.diagnostics.cycles = self.cycle;
        let prev_state = self.fsm.current_state();

        // 1. Sample all lines through the sampler (polarity + debounce)
        let snapshot = self.sampler.sample(hw);
        self.ctx.snapshot = snapshot;
        debug!("{}", diagnostics::cycle_trace(self.cycle, &snapshot, prev_state));

        // 2. Safety arbitration — precondition gate, before any sequencing
        let lockout = self.arbiter.check(&snapshot);
        self.ctx.lockout = self.arbiter.mask();

        match lockout {
            Some(l) => {
                if !self.was_lockout {
                    self.diagnostics.lockouts = self.diagnostics.lockouts.saturating_add(1);
                    sink.emit(&AppEvent::LockoutEntered(l.mask()));
                }
                if self.fsm.current_state() != AirlockState::SafetyLocked {
                    warn!("Lockout in force ({l}) — sequencing suspended");
                    self.fsm
                        .force_transition(AirlockState::SafetyLocked, &mut self.ctx);
                    // Drive the outputs closed now rather than waiting for
                    // the post-tick command application.
                    self.gateway.close_all(&snapshot, hw);
                }
            }
            None => {
                if self.was_lockout {
                    sink.emit(&AppEvent::LockoutCleared);
                }
            }
        }
        self.was_lockout = lockout.is_some();

        // 3. Sequencer tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 4. Progress watchpoints
        self.check_stuck(sink);

        // 5. Status reporting — pure function of the reported state
        let reported = self.reported_state();
        self.ctx.commands.indicator = status_color(reported, self.arbiter.has_lockout());

        // 6. Apply commands through the gateway
        self.apply_commands(hw, sink);

        // 7. Emit state change if the sequencer moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            self.diagnostics
                .record_transition(self.cycle, prev_state, new_state);
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        // 8. Periodic telemetry
        let interval = u64::from(self.ctx.config.telemetry_interval_cycles);
        if interval > 0 && self.cycle % interval == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (operator console, serial, tests).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::OperatorReset => {
                info!("Operator reset: returning to Idle");
                let prev = self.fsm.current_state();
                self.fsm.force_transition(AirlockState::Idle, &mut self.ctx);
                self.apply_commands(hw, sink);
                if prev != AirlockState::Idle {
                    sink.emit(&AppEvent::StateChanged {
                        from: prev,
                        to: AirlockState::Idle,
                    });
                }
            }
            AppCommand::ForceState(target) => {
                let prev = self.fsm.current_state();
                if let Some(passage) = passage_for(target) {
                    self.ctx.passage = passage;
                }
                self.fsm.force_transition(target, &mut self.ctx);
                self.apply_commands(hw, sink);
                if prev != target {
                    sink.emit(&AppEvent::StateChanged {
                        from: prev,
                        to: target,
                    });
                }
            }
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.sampler.reconfigure(&new_config);
                    self.ctx.config = new_config;
                    info!("Configuration updated at runtime");
                }
                Err(e) => {
                    warn!("Configuration update rejected: {e}");
                }
            },
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Internal sequencer state.
    pub fn state(&self) -> AirlockState {
        self.fsm.current_state()
    }

    /// Externally reported state: `MiddleOccupied` replaces `SafetyLocked`
    /// while an agent is trapped mid-chamber under a fault, so the status
    /// reporter can distinguish the two lockout flavours.
    pub fn reported_state(&self) -> AirlockState {
        if self.arbiter.has_lockout() && self.ctx.snapshot.middle {
            AirlockState::MiddleOccupied
        } else {
            self.fsm.current_state()
        }
    }

    /// Active lockout bitmask (0 = none).
    pub fn lockout_mask(&self) -> u8 {
        self.arbiter.mask()
    }

    /// Level currently driven for one gate.
    pub fn gate_open(&self, gate: Gate) -> bool {
        self.gateway.is_open(gate)
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Accumulated runtime diagnostics.
    pub fn diagnostics(&self) -> &CycleDiagnostics {
        &self.diagnostics
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> AirlockConfig {
        self.ctx.config.clone()
    }

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            cycle: self.cycle,
            state: self.reported_state().name(),
            front: self.ctx.snapshot.front,
            middle: self.ctx.snapshot.middle,
            back: self.ctx.snapshot.back,
            gate_a_open: self.gateway.is_open(Gate::A),
            gate_b_open: self.gateway.is_open(Gate::B),
            lockout_mask: self.arbiter.mask(),
            rejected_commands: self.gateway.rejected_count(),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate sequencer commands into gateway calls.
    fn apply_commands(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        for gate in [Gate::A, Gate::B] {
            let open = self.ctx.commands.is_open(gate);
            if let Err(rejected) = self.gateway.command(gate, open, &self.ctx.snapshot, hw) {
                // Correct enforcement of the obstruction invariant.
                sink.emit(&AppEvent::CommandRejected {
                    gate: rejected.gate,
                });
            }
        }
        self.diagnostics.rejected_commands = self.gateway.rejected_count();
        hw.set_indicator(self.ctx.commands.indicator);
    }

    /// Raise `StuckTransition` diagnostics: once when a transit state has
    /// made no progress for the configured number of cycles, and once per
    /// episode of the impossible both-gates-in-transit report. The machine
    /// holds position in both cases.
    fn check_stuck(&mut self, sink: &mut impl EventSink) {
        let state = self.fsm.current_state();
        let in_state = self.fsm.ticks_in_current_state();

        let threshold = u64::from(self.ctx.config.stuck_cycle_threshold);
        if state.is_transit() && in_state == threshold {
            warn!(
                "STUCK: no progress from {:?} after {} cycles",
                state, in_state
            );
            self.diagnostics.stuck_events = self.diagnostics.stuck_events.saturating_add(1);
            sink.emit(&AppEvent::StuckTransition {
                state,
                cycles: in_state,
            });
        }

        let both_moving = self.ctx.snapshot.moving_a && self.ctx.snapshot.moving_b;
        if both_moving && !self.motion_anomaly_latched {
            warn!("STUCK: both gates report motion simultaneously");
            self.diagnostics.stuck_events = self.diagnostics.stuck_events.saturating_add(1);
            sink.emit(&AppEvent::StuckTransition {
                state,
                cycles: in_state,
            });
        }
        self.motion_anomaly_latched = both_moving;
    }
}
