//! Agent configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use selph_bus::MessageBus;
use selph_core::{Error, Result};
use selph_state::{FilterKind, PerceptionFilterChain, Version};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Starting identity and version.
    pub identity: IdentityConfig,
    /// Signal memory and energy parameters.
    pub memory: MemoryConfig,
    /// Message bus parameters.
    pub bus: BusConfig,
    /// Default perception filter intensities.
    pub perception: PerceptionConfig,
    /// Seed and heartbeat cadence.
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity string the agent is born with.
    pub name: String,
    /// Starting semantic version, "major.minor.patch".
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Max signals held before the oldest is evicted.
    pub signal_capacity: usize,
    /// Energy drained per processed signal.
    pub energy_drain: f64,
    /// Energy at birth (0-100).
    pub initial_energy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Max envelopes kept in pipeline history.
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub intuition: f64,
    pub logic: f64,
    pub emotion: f64,
    pub creativity: f64,
    pub social: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for the jitter source. Unset means seeded from entropy.
    pub seed: Option<u64>,
    /// Heartbeat tick interval in milliseconds.
    pub heartbeat_ms: u64,
}

// ============================================================
// Defaults
// ============================================================

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { name: "selph".into(), version: "1.0.0".into() }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { signal_capacity: 50, energy_drain: 1.0, initial_energy: 100.0 }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { history_capacity: 500 }
    }
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self { intuition: 0.8, logic: 0.7, emotion: 0.6, creativity: 0.9, social: 0.5 }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { seed: None, heartbeat_ms: 1_000 }
    }
}

// ============================================================
// Loading
// ============================================================

impl AgentConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        self.version()?;
        if self.memory.signal_capacity == 0 {
            return Err(Error::config("memory.signal_capacity must be at least 1"));
        }
        if !self.memory.energy_drain.is_finite() || self.memory.energy_drain < 0.0 {
            return Err(Error::config("memory.energy_drain must be a finite, non-negative number"));
        }
        if self.bus.history_capacity == 0 {
            return Err(Error::config("bus.history_capacity must be at least 1"));
        }
        Ok(())
    }

    /// An empty bus sized from `[bus]`.
    pub fn message_bus(&self) -> MessageBus {
        MessageBus::new(self.bus.history_capacity)
    }

    pub fn version(&self) -> Result<Version> {
        self.identity.version.parse()
    }
}

impl PerceptionConfig {
    pub fn to_chain(&self) -> PerceptionFilterChain {
        PerceptionFilterChain::new(&[
            (FilterKind::Intuition, self.intuition),
            (FilterKind::Logic, self.logic),
            (FilterKind::Emotion, self.emotion),
            (FilterKind::Creativity, self.creativity),
            (FilterKind::Social, self.social),
        ])
    }
}
