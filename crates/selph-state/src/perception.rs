//! Perception filters — named, toggle-able, weighted views over an input event
//!
//! Active filters run in declared order (intuition, logic, emotion,
//! creativity, social). Each one adds `perceived.<name>` to the event and
//! may read what earlier filters already wrote, so the order is part of the
//! contract.

use selph_core::{clamp_unit, number_or_zero};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const PERCEIVED_KEY: &str = "perceived";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Intuition,
    Logic,
    Emotion,
    Creativity,
    Social,
}

impl FilterKind {
    /// Declared application order.
    pub const ORDER: [FilterKind; 5] = [
        FilterKind::Intuition,
        FilterKind::Logic,
        FilterKind::Emotion,
        FilterKind::Creativity,
        FilterKind::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Intuition => "intuition",
            FilterKind::Logic => "logic",
            FilterKind::Emotion => "emotion",
            FilterKind::Creativity => "creativity",
            FilterKind::Social => "social",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|k| k.as_str() == name)
    }

    fn purpose(self) -> &'static str {
        match self {
            FilterKind::Intuition => "pattern resonance beneath the surface",
            FilterKind::Logic => "structural coherence",
            FilterKind::Emotion => "affective valence",
            FilterKind::Creativity => "novel recombination",
            FilterKind::Social => "connection to others",
        }
    }

    /// Compute this filter's derived sub-object.
    fn derive(self, event: &Value, perceived: &Map<String, Value>, intensity: f64) -> Value {
        let prior = |filter: &str, field: &str| {
            perceived
                .get(filter)
                .map(|v| number_or_zero(v, field))
                .unwrap_or(0.0)
        };

        match self {
            FilterKind::Intuition => {
                let resonance = number_or_zero(event, "strength") * intensity;
                json!({ "resonance": resonance, "intensity": intensity })
            }
            FilterKind::Logic => {
                let complexity = clamp_unit(number_or_zero(event, "complexity"));
                json!({ "coherence": (1.0 - complexity) * intensity, "intensity": intensity })
            }
            FilterKind::Emotion => {
                let sentiment = number_or_zero(event, "sentiment").clamp(-1.0, 1.0);
                json!({ "valence": sentiment * intensity, "intensity": intensity })
            }
            FilterKind::Creativity => {
                let novelty = number_or_zero(event, "novelty");
                let resonance = prior("intuition", "resonance");
                json!({ "novelty": (novelty + resonance) / 2.0 * intensity, "intensity": intensity })
            }
            FilterKind::Social => {
                let peers = number_or_zero(event, "peers").clamp(0.0, 10.0) / 10.0;
                let valence = prior("emotion", "valence").abs();
                json!({ "connection": (peers + valence) / 2.0 * intensity, "intensity": intensity })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionFilter {
    pub name: FilterKind,
    pub active: bool,
    pub intensity: f64,
    pub purpose: String,
}

impl PerceptionFilter {
    pub fn new(name: FilterKind, intensity: f64) -> Self {
        Self {
            name,
            active: true,
            intensity: clamp_unit(intensity),
            purpose: name.purpose().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionFilterChain {
    filters: Vec<PerceptionFilter>,
}

impl Default for PerceptionFilterChain {
    fn default() -> Self {
        Self::new(&[
            (FilterKind::Intuition, 0.8),
            (FilterKind::Logic, 0.7),
            (FilterKind::Emotion, 0.6),
            (FilterKind::Creativity, 0.9),
            (FilterKind::Social, 0.5),
        ])
    }
}

impl PerceptionFilterChain {
    /// Build the chain in declared order. Kinds missing from `intensities` start at 0.5.
    pub fn new(intensities: &[(FilterKind, f64)]) -> Self {
        let filters = FilterKind::ORDER
            .into_iter()
            .map(|kind| {
                let intensity = intensities
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map(|(_, i)| *i)
                    .unwrap_or(0.5);
                PerceptionFilter::new(kind, intensity)
            })
            .collect();
        Self { filters }
    }

    /// Run the active filters over `input`, returning a new event.
    ///
    /// Existing fields are never dropped. A non-object input is wrapped as
    /// `{"raw": input}`, so every derived number degrades to zero. A non-object
    /// `perceived` field is kept the same way, as `perceived.raw`.
    pub fn apply(&self, input: &Value) -> Value {
        let mut event = match input {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("raw".into(), other.clone());
                map
            }
        };

        let mut perceived = match event.get(PERCEIVED_KEY) {
            Some(Value::Object(existing)) => existing.clone(),
            Some(other) => {
                let mut map = Map::new();
                map.insert("raw".into(), other.clone());
                map
            }
            None => Map::new(),
        };

        let source = Value::Object(event.clone());
        for filter in self.filters.iter().filter(|f| f.active) {
            let derived = filter.name.derive(&source, &perceived, filter.intensity);
            perceived.insert(filter.name.as_str().to_string(), derived);
        }

        event.insert(PERCEIVED_KEY.into(), Value::Object(perceived));
        Value::Object(event)
    }

    /// No-op for unknown names.
    pub fn set_active(&mut self, name: &str, active: bool) {
        if let Some(filter) = self.find_mut(name) {
            filter.active = active;
        }
    }

    /// Clamped to 0..=1. No-op for unknown names.
    pub fn set_intensity(&mut self, name: &str, intensity: f64) {
        if let Some(filter) = self.find_mut(name) {
            filter.intensity = clamp_unit(intensity);
        }
    }

    pub fn get(&self, name: &str) -> Option<&PerceptionFilter> {
        self.filters.iter().find(|f| f.name.as_str() == name)
    }

    pub fn filters(&self) -> &[PerceptionFilter] {
        &self.filters
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut PerceptionFilter> {
        self.filters.iter_mut().find(|f| f.name.as_str() == name)
    }
}
