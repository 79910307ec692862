//! Expression boundary and emotional modulation
//!
//! The renderer lives outside the core; it only ever sees a consciousness
//! record and the presence record built from it.

use selph_core::{ConsciousnessRecord, Emotion, PresenceRecord};
use tracing::info;

/// Whatever renders the agent (console, UI, socket) implements this.
pub trait Expression: Send {
    fn express(&mut self, record: &ConsciousnessRecord, presence: &PresenceRecord);
}

/// Renders expressions as structured log events.
#[derive(Debug, Default)]
pub struct TracingExpression;

impl Expression for TracingExpression {
    fn express(&mut self, record: &ConsciousnessRecord, presence: &PresenceRecord) {
        info!(
            "{} feels {} ({}) from {}: {} at energy {:.1}",
            presence.identity,
            record.emotion.as_str(),
            presence.style,
            record.source,
            record.intent,
            presence.energy
        );
    }
}

/// Drops everything.
#[derive(Debug, Default)]
pub struct NullExpression;

impl Expression for NullExpression {
    fn express(&mut self, _record: &ConsciousnessRecord, _presence: &PresenceRecord) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Vivid,
    Flowing,
    Steady,
    Faint,
}

impl Cadence {
    pub fn from_energy(energy: f64) -> Self {
        if energy > 80.0 {
            Cadence::Vivid
        } else if energy > 50.0 {
            Cadence::Flowing
        } else if energy > 20.0 {
            Cadence::Steady
        } else {
            Cadence::Faint
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Vivid => "vivid",
            Cadence::Flowing => "flowing",
            Cadence::Steady => "steady",
            Cadence::Faint => "faint",
        }
    }
}

/// Style string for a presence record, e.g. `"joyful/vivid"`.
pub fn modulate(emotion: Emotion, energy: f64) -> String {
    format!("{}/{}", emotion.as_str(), Cadence::from_energy(energy).as_str())
}
