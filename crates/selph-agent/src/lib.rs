//! Selph Agent — the externally addressable agent
//!
//! - `facade`: AgentFacade, composing state, identity, peers and expression
//! - `expression`: rendering boundary and emotional modulation
//! - `config`: TOML configuration with defaults
//! - `heartbeat`: tokio-driven tick loop over a shared agent

pub mod config;
pub mod expression;
pub mod facade;
pub mod heartbeat;

pub use config::AgentConfig;
pub use expression::{modulate, Cadence, Expression, NullExpression, TracingExpression};
pub use facade::{AgentFacade, AgentParts, IdentityCard};
pub use heartbeat::{Heartbeat, SharedAgent};
