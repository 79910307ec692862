//! Core types for Selph

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A named, weighted unit of stimulus.
///
/// Strength is unconstrained; callers conventionally keep it within 0..=1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub strength: f64,
}

impl Signal {
    pub fn new(name: impl Into<String>, strength: f64) -> Self {
        Self {
            name: name.into(),
            strength,
        }
    }

    /// Derive a signal from a raw stimulus payload.
    ///
    /// Name comes from `name`, then `type`, then falls back to `"stimulus"`.
    /// A missing or non-numeric `strength` reads as 0.
    pub fn from_stimulus(stimulus: &Value) -> Self {
        let name = stimulus
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| stimulus.get("type").and_then(Value::as_str))
            .unwrap_or("stimulus");
        Self::new(name, number_or_zero(stimulus, "strength"))
    }
}

/// Read a numeric field, treating anything missing or malformed as 0.
pub fn number_or_zero(value: &Value, key: &str) -> f64 {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Clamp to the unit interval. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Active,
    Dormant,
    Focused,
    Distributed,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Active => "active",
            Presence::Dormant => "dormant",
            Presence::Focused => "focused",
            Presence::Distributed => "distributed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intuition {
    Aligned,
    Conflicted,
    Seeking,
    Crystallized,
}

impl Intuition {
    /// Bucket the strongest remembered signal strength.
    pub fn from_strength(strength: Option<f64>) -> Self {
        match strength {
            Some(s) if s >= 0.8 => Intuition::Crystallized,
            Some(s) if s >= 0.5 => Intuition::Aligned,
            Some(s) if s >= 0.2 => Intuition::Seeking,
            _ => Intuition::Conflicted,
        }
    }
}

/// Coarse categorical decision derived from energy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Create,
    Explore,
    Conserve,
    Restore,
}

impl Intent {
    /// Energy bands are strict: exactly 80 is `Explore`, not `Create`.
    pub fn from_energy(energy: f64) -> Self {
        if energy > 80.0 {
            Intent::Create
        } else if energy > 50.0 {
            Intent::Explore
        } else if energy > 20.0 {
            Intent::Conserve
        } else {
            Intent::Restore
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Create => "Create",
            Intent::Explore => "Explore",
            Intent::Conserve => "Conserve",
            Intent::Restore => "Restore",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating mode of the system-state module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Creative,
    Logical,
    Intuitive,
    Social,
    Evolutionary,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Creative,
        Mode::Logical,
        Mode::Intuitive,
        Mode::Social,
        Mode::Evolutionary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Creative => "creative",
            Mode::Logical => "logical",
            Mode::Intuitive => "intuitive",
            Mode::Social => "social",
            Mode::Evolutionary => "evolutionary",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Calm,
    Focused,
    Energetic,
    Warm,
    Curious,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Inner,
    Analysis,
    Exploration,
    Connection,
    Growth,
    Creation,
    Stability,
    Recovery,
}

impl Focus {
    pub fn from_mode(mode: Mode) -> Self {
        match mode {
            Mode::Creative => Focus::Exploration,
            Mode::Logical => Focus::Analysis,
            Mode::Intuitive => Focus::Inner,
            Mode::Social => Focus::Connection,
            Mode::Evolutionary => Focus::Growth,
        }
    }

    pub fn from_intent(intent: Intent) -> Self {
        match intent {
            Intent::Create => Focus::Creation,
            Intent::Explore => Focus::Exploration,
            Intent::Conserve => Focus::Stability,
            Intent::Restore => Focus::Recovery,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Serene,
    Determined,
    Joyful,
    Tender,
    Curious,
}

impl Emotion {
    pub fn from_tone(tone: Tone) -> Self {
        match tone {
            Tone::Calm => Emotion::Serene,
            Tone::Focused => Emotion::Determined,
            Tone::Energetic => Emotion::Joyful,
            Tone::Warm => Emotion::Tender,
            Tone::Curious => Emotion::Curious,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Serene => "serene",
            Emotion::Determined => "determined",
            Emotion::Joyful => "joyful",
            Emotion::Tender => "tender",
            Emotion::Curious => "curious",
        }
    }
}

/// Wall-clock partition used by environment adaptation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    Night,
    Working,
    Leisure,
}

impl DayPeriod {
    /// Night is 22:00-05:59, working hours 09:00-17:59, everything else leisure.
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            h if h >= 22 || h < 6 => DayPeriod::Night,
            9..=17 => DayPeriod::Working,
            _ => DayPeriod::Leisure,
        }
    }
}
