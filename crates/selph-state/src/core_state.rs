//! CoreState — energy, presence, depth and the signal memory that feeds them
//!
//! `process` is the only way signals enter; energy drains by a fixed step per
//! signal and only comes back through `restore`. Depth only grows.

use crate::memory::{SignalMemory, DEFAULT_SIGNAL_CAPACITY};
use selph_core::{Intuition, Presence, Signal};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_ENERGY: f64 = 100.0;
pub const DEFAULT_ENERGY_DRAIN: f64 = 1.0;
/// Below this energy the core goes dormant.
pub const DORMANT_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct CoreState {
    presence: Presence,
    intuition: Intuition,
    energy: f64,
    depth: f64,
    drain: f64,
    memory: SignalMemory,
}

/// Read-only view of a CoreState at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreSnapshot {
    pub presence: Presence,
    pub intuition: Intuition,
    pub energy: f64,
    pub depth: f64,
    pub memory_len: usize,
    pub strongest: Option<Signal>,
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_CAPACITY, DEFAULT_ENERGY_DRAIN)
    }
}

impl CoreState {
    pub fn new(memory_capacity: usize, drain: f64) -> Self {
        Self {
            presence: Presence::Active,
            intuition: Intuition::Seeking,
            energy: MAX_ENERGY,
            depth: 0.0,
            drain: if drain.is_finite() { drain.max(0.0) } else { DEFAULT_ENERGY_DRAIN },
            memory: SignalMemory::new(memory_capacity),
        }
    }

    /// Start from a specific energy level (clamped to 0..=100).
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = clamp_energy(energy);
        self.refresh_presence();
        self
    }

    /// Register one signal and let it reshape the state.
    pub fn process(&mut self, signal: Signal) -> CoreSnapshot {
        debug!(
            "Processing signal {} ({:.2}), energy {:.1}",
            signal.name, signal.strength, self.energy
        );
        self.memory.register(signal);
        self.energy = clamp_energy(self.energy - self.drain);
        self.intuition = Intuition::from_strength(self.memory.strongest().map(|s| s.strength));
        self.refresh_presence();
        self.snapshot()
    }

    /// Give energy back, up to the ceiling.
    pub fn restore(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.energy = clamp_energy(self.energy + amount);
        }
        self.refresh_presence();
    }

    pub fn deepen_focus(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.depth += amount;
        }
        self.presence = Presence::Focused;
    }

    pub fn distribute(&mut self) {
        self.presence = Presence::Distributed;
    }

    fn refresh_presence(&mut self) {
        if self.energy < DORMANT_THRESHOLD {
            self.presence = Presence::Dormant;
        } else if self.presence == Presence::Dormant {
            self.presence = Presence::Active;
        }
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            presence: self.presence,
            intuition: self.intuition,
            energy: self.energy,
            depth: self.depth,
            memory_len: self.memory.len(),
            strongest: self.memory.strongest().cloned(),
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn intuition(&self) -> Intuition {
        self.intuition
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn memory(&self) -> &SignalMemory {
        &self.memory
    }
}

fn clamp_energy(energy: f64) -> f64 {
    if energy.is_nan() {
        0.0
    } else {
        energy.clamp(0.0, MAX_ENERGY)
    }
}
