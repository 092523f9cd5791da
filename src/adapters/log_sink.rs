//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (console in the simulation, serial in a deployment). A
//! display-driver adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | cycle={} | state={} | zones f={} m={} b={} | \
                     gates A={} B={} | lockout=0b{:08b} | rejected={}",
                    t.cycle,
                    t.state,
                    u8::from(t.front),
                    u8::from(t.middle),
                    u8::from(t.back),
                    if t.gate_a_open { "open" } else { "closed" },
                    if t.gate_b_open { "open" } else { "closed" },
                    t.lockout_mask,
                    t.rejected_commands,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::LockoutEntered(mask) => {
                warn!("LOCKOUT | entered, mask=0b{:08b}", mask);
            }
            AppEvent::LockoutCleared => {
                info!("LOCKOUT | cleared");
            }
            AppEvent::CommandRejected { gate } => {
                warn!("REJECT | gate {} open refused by gateway", gate);
            }
            AppEvent::StuckTransition { state, cycles } => {
                warn!("STUCK | no progress from {:?} after {} cycles", state, cycles);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
