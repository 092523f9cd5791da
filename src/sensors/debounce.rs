//! Per-line polarity normalization and debounce.
//!
//! The two fielded sensor harnesses disagree on wiring convention: one
//! pulls lines low when active and expects level sensing, the other runs
//! toggle (edge) signalling where each pulse flips the logical value.
//! Rather than hard-code either, the policy is a deployment parameter
//! applied uniformly at the sampler boundary.
//!
//! Debounce is a simple run-length filter: a normalized level must hold
//! for `debounce_cycles` consecutive cycles before the stable value
//! changes. Zero disables the filter. This is the only state the sampler
//! carries across cycles.

use serde::{Deserialize, Serialize};

/// How a raw line level becomes a logical boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineMode {
    /// The normalized level *is* the logical value.
    Level,
    /// Each debounced inactive→active edge flips the logical value.
    Toggle,
}

/// Polarity / edge policy for every digital line (deployment parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePolicy {
    /// `true`: a high raw level means "active". `false`: active-low wiring.
    pub active_high: bool,
    /// Level sensing or toggle signalling.
    pub mode: LineMode,
}

impl Default for LinePolicy {
    fn default() -> Self {
        Self {
            active_high: true,
            mode: LineMode::Level,
        }
    }
}

/// Debounce and edge state for a single digital line.
#[derive(Debug, Clone, Copy)]
pub struct DebouncedLine {
    /// Debounced normalized level.
    stable: bool,
    /// Level currently being counted toward a change of `stable`.
    candidate: bool,
    /// Consecutive cycles `candidate` has held against `stable`.
    run: u8,
    /// Logical output after the mode policy.
    logical: bool,
}

impl DebouncedLine {
    pub fn new() -> Self {
        Self {
            stable: false,
            candidate: false,
            run: 0,
            logical: false,
        }
    }

    /// Feed one raw sample; returns the logical value for this cycle.
    pub fn update(&mut self, raw_high: bool, policy: LinePolicy, debounce_cycles: u8) -> bool {
        let level = raw_high == policy.active_high;

        let mut rose = false;
        if level == self.stable {
            self.candidate = level;
            self.run = 0;
        } else {
            if level != self.candidate {
                self.candidate = level;
                self.run = 0;
            }
            self.run = self.run.saturating_add(1);
            if self.run >= debounce_cycles {
                rose = level && !self.stable;
                self.stable = level;
                self.run = 0;
            }
        }

        match policy.mode {
            LineMode::Level => self.logical = self.stable,
            LineMode::Toggle => {
                if rose {
                    self.logical = !self.logical;
                }
            }
        }
        self.logical
    }

    /// Logical value from the most recent sample.
    pub const fn value(&self) -> bool {
        self.logical
    }
}
