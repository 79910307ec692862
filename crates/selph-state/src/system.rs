//! SelphOs — operating mode, tone and focus, plus the perception chain they tune
//!
//! The mode is a joint configuration picked from the hour of day and the last
//! decision, not a transition table. `process_input` is the single entry point:
//! filter, adapt to the environment, decide, update.

use crate::perception::{FilterKind, PerceptionFilter, PerceptionFilterChain};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use selph_core::{clamp_unit, Clock, DayPeriod, Focus, Intent, Mode, Tone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Cosmetic jitter applied to the adaptation level each update.
const ADAPTATION_JITTER: f64 = 0.02;
const ADAPTATION_STEP: f64 = 0.05;
/// Leisure hour a fresh system starts in; matches the creative/energetic start.
const INITIAL_HOUR: u32 = 18;

/// Per-mode filter intensities applied on `switch_mode`. Unlisted filters keep their value.
pub static MODE_PROFILES: [(Mode, &[(FilterKind, f64)]); 5] = [
    (Mode::Creative, &[(FilterKind::Creativity, 1.0), (FilterKind::Logic, 0.35)]),
    (
        Mode::Logical,
        &[(FilterKind::Logic, 1.0), (FilterKind::Creativity, 0.45), (FilterKind::Emotion, 0.3)],
    ),
    (
        Mode::Intuitive,
        &[(FilterKind::Intuition, 1.0), (FilterKind::Logic, 0.5), (FilterKind::Emotion, 0.8)],
    ),
    (Mode::Social, &[(FilterKind::Social, 1.0), (FilterKind::Emotion, 0.9)]),
    (
        Mode::Evolutionary,
        &[(FilterKind::Intuition, 0.9), (FilterKind::Creativity, 0.9), (FilterKind::Logic, 0.7)],
    ),
];

pub fn mode_profile(mode: Mode) -> &'static [(FilterKind, f64)] {
    MODE_PROFILES
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, profile)| *profile)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub hour: u32,
    pub period: DayPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelphOsState {
    pub mode: Mode,
    pub focus: Focus,
    pub tone: Tone,
    pub adaptation_level: f64,
    pub environment: Environment,
}

/// Mode, tone and filter weights as other components read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub mode: Mode,
    pub tone: Tone,
    pub focus: Focus,
    pub filters: Vec<PerceptionFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub intent: Intent,
    /// Identity proposal label: "boost", "restore" or "maintain".
    pub proposal: String,
    pub energy: f64,
    pub source: String,
}

/// Snapshot record consumed by external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub state: SelphOsState,
    pub filters: Vec<PerceptionFilter>,
    pub decision: Decision,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub input: Value,
    pub filtered: Value,
    pub snapshot: SnapshotRecord,
}

/// Makes the intent decision for one processing cycle.
pub trait Decider {
    fn decide(&mut self, filtered: &Value, state: &SelphOsState) -> Decision;
}

#[derive(Debug)]
pub struct SelphOs {
    state: SelphOsState,
    filters: PerceptionFilterChain,
    rng: StdRng,
}

impl SelphOs {
    pub fn new(filters: PerceptionFilterChain, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: SelphOsState {
                mode: Mode::Creative,
                focus: Focus::Exploration,
                tone: Tone::Energetic,
                adaptation_level: 0.5,
                environment: Environment {
                    hour: INITIAL_HOUR,
                    period: DayPeriod::from_hour(INITIAL_HOUR),
                },
            },
            filters,
            rng,
        }
    }

    /// Pick mode and tone from the hour. Returns true when the mode changed.
    pub fn adapt_to_environment(&mut self, hour: u32) -> bool {
        let period = DayPeriod::from_hour(hour);
        let (mode, tone) = match period {
            DayPeriod::Night => (Mode::Intuitive, Tone::Calm),
            DayPeriod::Working => (Mode::Logical, Tone::Focused),
            DayPeriod::Leisure => (Mode::Creative, Tone::Energetic),
        };
        self.state.environment = Environment {
            hour: hour % 24,
            period,
        };
        self.state.tone = tone;
        self.state.focus = Focus::from_mode(mode);

        if mode != self.state.mode {
            self.switch_mode(mode);
            true
        } else {
            false
        }
    }

    /// Enter `mode` and re-weight the perception chain from its profile.
    pub fn switch_mode(&mut self, mode: Mode) {
        info!("Switching mode {} → {}", self.state.mode, mode);
        self.state.mode = mode;
        self.state.focus = Focus::from_mode(mode);
        for (kind, intensity) in mode_profile(mode) {
            self.filters.set_intensity(kind.as_str(), *intensity);
        }
    }

    pub fn process_input(
        &mut self,
        input: &Value,
        clock: &dyn Clock,
        decider: &mut dyn Decider,
    ) -> ProcessOutcome {
        let filtered = self.filters.apply(input);
        self.adapt_to_environment(clock.hour());
        let decision = decider.decide(&filtered, &self.state);
        self.update_state(&decision);

        debug!(
            "Processed input: mode={} intent={} adaptation={:.3}",
            self.state.mode, decision.intent, self.state.adaptation_level
        );

        ProcessOutcome {
            input: input.clone(),
            filtered,
            snapshot: SnapshotRecord {
                state: self.state.clone(),
                filters: self.filters.filters().to_vec(),
                decision,
                timestamp: clock.now(),
            },
        }
    }

    /// Fold one decision back into the state.
    pub fn update_state(&mut self, decision: &Decision) {
        self.state.focus = Focus::from_intent(decision.intent);
        if decision.intent == Intent::Restore {
            self.state.tone = Tone::Calm;
        }
        let level = self.state.adaptation_level;
        let jitter = self.rng.gen_range(-ADAPTATION_JITTER..=ADAPTATION_JITTER);
        self.state.adaptation_level = clamp_unit(level + (1.0 - level) * ADAPTATION_STEP + jitter);
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            mode: self.state.mode,
            tone: self.state.tone,
            focus: self.state.focus,
            filters: self.filters.filters().to_vec(),
        }
    }

    pub fn state(&self) -> &SelphOsState {
        &self.state
    }

    pub fn filters(&self) -> &PerceptionFilterChain {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut PerceptionFilterChain {
        &mut self.filters
    }

    /// Draw a value from the seeded source, for callers needing cosmetic jitter.
    pub fn jitter(&mut self, spread: f64) -> f64 {
        if spread <= 0.0 || !spread.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(-spread..=spread)
    }
}
