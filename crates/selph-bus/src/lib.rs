//! Selph Bus - fan-out message pipeline over capability-declaring modules

pub mod adapters;
pub mod bus;
pub mod history;
pub mod module;

pub use bus::{
    Delivery, IterationOutcome, IterationReport, MessageBus, ModuleFailure, ModuleId,
    ITERATION_SUCCESS_ENERGY,
};
pub use history::{History, DEFAULT_HISTORY_CAPACITY};
pub use module::{BusModule, Capabilities, Shared};
