//! Selph — agent state & messaging core
//!
//! The binary is a thin host: it reads stimuli, ticks the agent, and writes
//! presence records. These helpers are shared with the integration tests.

pub mod driver;
pub mod logging;
