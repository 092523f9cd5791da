//! System configuration parameters
//!
//! All tunable parameters for the airlock controller. Constructed once in
//! `main` and injected into the service; there is no ambient or persisted
//! configuration state. Values can be overridden at runtime through
//! `AppCommand::UpdateConfig`.

use serde::{Deserialize, Serialize};

use crate::sensors::debounce::LinePolicy;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlockConfig {
    // --- Timing ---
    /// Control cycle period (milliseconds)
    pub cycle_period_ms: u32,

    // --- Sensor sampling ---
    /// Polarity / edge policy applied to every digital line.
    /// Deployment parameter: the two fielded sensor harnesses disagree on
    /// convention, so this is configured per installation, never hard-coded.
    pub line_policy: LinePolicy,
    /// Consecutive cycles a raw level must hold before the logical boolean
    /// changes (0 disables debouncing)
    pub debounce_cycles: u8,

    // --- Failure handling ---
    /// Cycles without sequencing progress before a stuck-transition
    /// diagnostic is raised (operator-configurable)
    pub stuck_cycle_threshold: u32,

    // --- Diagnostics ---
    /// Telemetry event interval in cycles (0 disables telemetry)
    pub telemetry_interval_cycles: u32,
}

impl Default for AirlockConfig {
    fn default() -> Self {
        Self {
            // Timing
            cycle_period_ms: 100, // 10 Hz

            // Sensor sampling
            line_policy: LinePolicy::default(),
            debounce_cycles: 0,

            // Failure handling
            stuck_cycle_threshold: 600, // 60 s at 100 ms cycles

            // Diagnostics
            telemetry_interval_cycles: 50, // every 5 s
        }
    }
}

impl AirlockConfig {
    /// Range-check the configuration. Invalid values are rejected, not
    /// silently clamped, so a bad runtime update cannot disable the
    /// stuck-transition watchpoint or stall the loop.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.cycle_period_ms == 0 {
            return Err(crate::error::Error::Config("cycle_period_ms must be > 0"));
        }
        if self.stuck_cycle_threshold == 0 {
            return Err(crate::error::Error::Config(
                "stuck_cycle_threshold must be > 0",
            ));
        }
        Ok(())
    }
}
