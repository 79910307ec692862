//! Record shapes exchanged with external collaborators, plus the bus envelope.

use crate::types::{Emotion, Intent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Broadcast-ready presence record produced by every agent tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub identity: String,
    pub style: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub intent: Intent,
    pub energy: f64,
}

/// What the agent is "conscious of" after processing one stimulus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessRecord {
    pub intent: Intent,
    pub emotion: Emotion,
    pub source: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Transmit,
    Update,
    EvolutionIteration,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Transmit => "transmit",
            MessageKind::Update => "update",
            MessageKind::EvolutionIteration => "evolution_iteration",
        }
    }
}

/// A payload stamped by the message bus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub payload: Value,
}

impl Envelope {
    pub fn new(kind: MessageKind, payload: Value) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            payload,
        }
    }
}
