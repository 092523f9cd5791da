//! In-memory simulation adapter.
//!
//! Stands in for the real line harness and gate actuators: raw levels
//! live on a shared bus, gates move with a configurable travel time, and
//! every output the domain drives is recorded for assertions. Used by
//! the `airlock-sim` binary's scripted scenarios and reusable from
//! integration tests.
//!
//! The raw-line path goes through `embedded-hal` [`InputPin`]s exactly as
//! a real GPIO adapter would, including the error path: a line marked
//! failed returns a pin error, which the sampler converts into its
//! fail-closed snapshot.

use core::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{Error as HalError, ErrorKind, ErrorType, InputPin};

use crate::app::ports::ActuatorPort;
use crate::drivers::status_led::{Rgb, StatusLed};
use crate::error::SensorFault;
use crate::fsm::context::Gate;
use crate::sensors::{LineId, LineSource};
use crate::status::StatusColor;

// ───────────────────────────────────────────────────────────────
// Shared line bus and simulated pins
// ───────────────────────────────────────────────────────────────

struct BusState {
    levels: [bool; LineId::COUNT],
    failed: [bool; LineId::COUNT],
}

/// Handle to the shared raw-line state. Cheap to clone; single-threaded.
#[derive(Clone)]
pub struct SimBus {
    state: Rc<RefCell<BusState>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                levels: [false; LineId::COUNT],
                failed: [false; LineId::COUNT],
            })),
        }
    }

    /// A pin bound to one line of this bus.
    pub fn pin(&self, line: LineId) -> SimPin {
        SimPin {
            state: Rc::clone(&self.state),
            line,
        }
    }

    /// Set a raw electrical level.
    pub fn set(&self, line: LineId, high: bool) {
        self.state.borrow_mut().levels[line.index()] = high;
    }

    /// Mark a line unreadable (or readable again).
    pub fn fail(&self, line: LineId, failed: bool) {
        self.state.borrow_mut().failed[line.index()] = failed;
    }
}

/// Error returned by a failed simulated pin read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl HalError for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One simulated GPIO input pin.
pub struct SimPin {
    state: Rc<RefCell<BusState>>,
    line: LineId,
}

impl ErrorType for SimPin {
    type Error = SimPinError;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let state = self.state.borrow();
        if state.failed[self.line.index()] {
            return Err(SimPinError);
        }
        Ok(state.levels[self.line.index()])
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

// ───────────────────────────────────────────────────────────────
// Generic HAL-pin line source
// ───────────────────────────────────────────────────────────────

/// [`LineSource`] over any HAL's input pins, one per line in
/// [`LineId::ALL`] order. A pin error maps to the line's sensor fault.
pub struct GpioLineSource<P: InputPin> {
    pins: [P; LineId::COUNT],
}

impl<P: InputPin> GpioLineSource<P> {
    pub fn new(pins: [P; LineId::COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> LineSource for GpioLineSource<P> {
    fn read_line(&mut self, line: LineId) -> Result<bool, SensorFault> {
        self.pins[line.index()]
            .is_high()
            .map_err(|_| SensorFault { line })
    }
}

// ───────────────────────────────────────────────────────────────
// Gate motion model
// ───────────────────────────────────────────────────────────────

/// A gate that takes `travel_cycles` to move between positions. With a
/// travel time of zero it settles instantly, which keeps unit tests free
/// of motion bookkeeping.
struct SimGate {
    commanded: bool,
    position: bool,
    travel_cycles: u32,
    cycles_left: u32,
}

impl SimGate {
    fn new(travel_cycles: u32) -> Self {
        Self {
            commanded: false,
            position: false,
            travel_cycles,
            cycles_left: 0,
        }
    }

    fn command(&mut self, open: bool) {
        if open != self.commanded {
            self.commanded = open;
            if self.position != self.commanded {
                self.cycles_left = self.travel_cycles;
                if self.cycles_left == 0 {
                    self.position = self.commanded;
                }
            } else {
                self.cycles_left = 0;
            }
        }
    }

    fn step(&mut self) {
        if self.position != self.commanded {
            self.cycles_left = self.cycles_left.saturating_sub(1);
            if self.cycles_left == 0 {
                self.position = self.commanded;
            }
        }
    }

    fn moving(&self) -> bool {
        self.position != self.commanded
    }
}

// ───────────────────────────────────────────────────────────────
// SimHardware
// ───────────────────────────────────────────────────────────────

/// Full simulated plant: line bus, two gates, and the status indicator.
pub struct SimHardware {
    bus: SimBus,
    source: GpioLineSource<SimPin>,
    gates: [SimGate; 2],
    led: StatusLed,
    indicator: StatusColor,
}

impl SimHardware {
    /// Instant-settling gates — the default for unit tests.
    pub fn new() -> Self {
        Self::with_travel_cycles(0)
    }

    /// Gates that take `travel_cycles` control cycles to open or close.
    pub fn with_travel_cycles(travel_cycles: u32) -> Self {
        let bus = SimBus::new();
        let pins = LineId::ALL.map(|line| bus.pin(line));
        Self {
            bus,
            source: GpioLineSource::new(pins),
            gates: [SimGate::new(travel_cycles), SimGate::new(travel_cycles)],
            led: StatusLed::new(),
            indicator: StatusColor::Green,
        }
    }

    /// Set a raw line level (scenario scripting).
    pub fn set_line(&mut self, line: LineId, high: bool) {
        self.bus.set(line, high);
    }

    /// Mark a line unreadable (fault injection).
    pub fn fail_line(&mut self, line: LineId, failed: bool) {
        self.bus.fail(line, failed);
    }

    /// Advance the plant one cycle: gates move, motion feedback lines
    /// update, the indicator renders. Call once per control cycle, after
    /// the service tick.
    pub fn step(&mut self) {
        for gate in &mut self.gates {
            gate.step();
        }
        self.bus
            .set(LineId::MovingA, self.gates[Gate::A.index()].moving());
        self.bus
            .set(LineId::MovingB, self.gates[Gate::B.index()].moving());
        let _ = self.led.tick();
    }

    /// Open-request level currently driven for one gate.
    pub fn gate_driven(&self, gate: Gate) -> bool {
        self.gates[gate.index()].commanded
    }

    /// Physical position of one gate (`true` = open).
    pub fn gate_position(&self, gate: Gate) -> bool {
        self.gates[gate.index()].position
    }

    /// Indicator colour most recently driven.
    pub fn indicator(&self) -> StatusColor {
        self.indicator
    }

    /// RGB levels from the most recent render.
    pub fn led_rgb(&self) -> Rgb {
        self.led.current()
    }
}

impl LineSource for SimHardware {
    fn read_line(&mut self, line: LineId) -> Result<bool, SensorFault> {
        self.source.read_line(line)
    }
}

impl ActuatorPort for SimHardware {
    fn set_gate(&mut self, gate: Gate, open: bool) {
        // Motion feedback becomes visible on the next bus update in step().
        self.gates[gate.index()].command(open);
    }

    fn set_indicator(&mut self, color: StatusColor) {
        self.indicator = color;
        self.led.set_color(color);
    }

    fn all_closed(&mut self) {
        self.gates[0].command(false);
        self.gates[1].command(false);
    }
}
