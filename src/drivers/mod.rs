//! Output drivers shared by the hardware adapters.

pub mod status_led;
