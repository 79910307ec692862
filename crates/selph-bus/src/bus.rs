//! MessageBus — ordered fan-out with per-module fault isolation
//!
//! Every payload is stamped with a correlation id and timestamp, recorded in
//! the bounded history, then delivered to each capable module in
//! registration order. A module that errors or panics is logged with its
//! index and skipped; delivery continues and the caller never sees the fault.

use crate::history::{History, DEFAULT_HISTORY_CAPACITY};
use crate::module::{BusModule, Capabilities};
use selph_core::{Envelope, MessageKind};
use selph_state::{CoreState, IdentityEvolution, Version};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};
use uuid::Uuid;

/// Energy above which an evolution iteration counts as a success.
pub const ITERATION_SUCCESS_ENERGY: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleFailure {
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// What happened to one transmitted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub correlation_id: Uuid,
    pub delivered: usize,
    pub skipped: usize,
    pub failures: Vec<ModuleFailure>,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationReport {
    pub success: bool,
    pub evolved: bool,
    pub proposal: String,
    pub energy: f64,
    pub identity: String,
    pub version: Version,
}

#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub report: IterationReport,
    pub delivery: Delivery,
}

struct Registered {
    id: ModuleId,
    name: String,
    capabilities: Capabilities,
    module: Box<dyn BusModule>,
}

pub struct MessageBus {
    modules: Vec<Registered>,
    history: History,
    next_id: u64,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MessageBus {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            modules: Vec::new(),
            history: History::new(history_capacity),
            next_id: 0,
        }
    }

    /// Build a bus with an explicit module list, registered in order.
    pub fn with_modules(history_capacity: usize, modules: Vec<Box<dyn BusModule>>) -> Self {
        let mut bus = Self::new(history_capacity);
        for module in modules {
            bus.add_module(module);
        }
        bus
    }

    /// Append a module to the fan-out list. Capabilities are read here, once.
    pub fn add_module(&mut self, module: impl BusModule + 'static) -> ModuleId {
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        let name = module.name().to_string();
        let capabilities = module.capabilities();
        debug!(
            "Registered bus module #{} {} (receive={}, update={})",
            self.modules.len(),
            name,
            capabilities.receive,
            capabilities.update
        );
        self.modules.push(Registered {
            id,
            name,
            capabilities,
            module: Box::new(module),
        });
        id
    }

    pub fn remove_module(&mut self, id: ModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|m| m.id != id);
        before != self.modules.len()
    }

    /// Deliver `data` to every module that can `receive`.
    pub fn transmit(&mut self, data: Value) -> Delivery {
        self.dispatch(MessageKind::Transmit, data)
    }

    /// Deliver `update_data` to every module that can `update`.
    pub fn broadcast_update(&mut self, update_data: Value) -> Delivery {
        self.dispatch(MessageKind::Update, update_data)
    }

    /// Run one evolution cycle against `core` and publish the result.
    pub fn run_iteration(
        &mut self,
        core: &CoreState,
        identity: &mut IdentityEvolution,
    ) -> IterationOutcome {
        let energy = core.energy();
        let proposal = identity.propose_mutation(energy).label().to_string();
        let evolved = identity.evolve(energy);
        let report = IterationReport {
            success: energy > ITERATION_SUCCESS_ENERGY,
            evolved,
            proposal,
            energy,
            identity: identity.identity().to_string(),
            version: identity.version(),
        };
        let payload = serde_json::to_value(&report).unwrap_or(Value::Null);
        let delivery = self.dispatch(MessageKind::EvolutionIteration, payload);
        IterationOutcome { report, delivery }
    }

    fn dispatch(&mut self, kind: MessageKind, payload: Value) -> Delivery {
        let envelope = Envelope::new(kind, payload);
        self.history.push(envelope.clone());

        let mut delivery = Delivery {
            correlation_id: envelope.correlation_id,
            delivered: 0,
            skipped: 0,
            failures: Vec::new(),
        };

        for (index, entry) in self.modules.iter_mut().enumerate() {
            let wants = match kind {
                MessageKind::Update => entry.capabilities.update,
                MessageKind::Transmit | MessageKind::EvolutionIteration => entry.capabilities.receive,
            };
            if !wants {
                delivery.skipped += 1;
                continue;
            }

            let module = &mut entry.module;
            let outcome = catch_unwind(AssertUnwindSafe(|| match kind {
                MessageKind::Update => module.update(&envelope),
                _ => module.receive(&envelope),
            }));

            let message = match outcome {
                Ok(Ok(())) => {
                    delivery.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            warn!(
                "Bus module #{} ({}) failed on {} {}: {}",
                index,
                entry.name,
                kind.as_str(),
                envelope.correlation_id,
                message
            );
            delivery.failures.push(ModuleFailure {
                index,
                name: entry.name.clone(),
                message,
            });
        }

        delivery
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
