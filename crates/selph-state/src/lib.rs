//! Selph State — the agent's mutable internals
//!
//! - `memory`: bounded FIFO of weighted signals
//! - `core_state`: energy, presence and depth, fed by signals
//! - `perception`: ordered, weighted filter chain over input events
//! - `system`: mode/tone selection and the processing cycle
//! - `identity`: versioned identity and its mutation log
//! - `peers`: known peers and shared intelligence

pub mod core_state;
pub mod identity;
pub mod memory;
pub mod peers;
pub mod perception;
pub mod system;

pub use core_state::{CoreSnapshot, CoreState};
pub use identity::{EvolutionStats, IdentityEvolution, MutationLogEntry, Proposal, Version};
pub use memory::SignalMemory;
pub use peers::PeerRegistry;
pub use perception::{FilterKind, PerceptionFilter, PerceptionFilterChain};
pub use system::{
    Configuration, Decider, Decision, Environment, ProcessOutcome, SelphOs, SelphOsState,
    SnapshotRecord,
};
