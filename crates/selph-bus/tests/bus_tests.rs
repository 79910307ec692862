//! Tests for selph-bus: fan-out, fault isolation, history, iterations, adapters

use selph_bus::*;
use selph_core::{Envelope, Error, MessageKind, Mode, Result};
use selph_state::{
    CoreState, IdentityEvolution, PeerRegistry, PerceptionFilterChain, SelphOs, Version,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

#[derive(Clone, Copy)]
enum Fault {
    None,
    Error,
    Panic,
}

struct Recorder {
    name: String,
    capabilities: Capabilities,
    fault: Fault,
    log: Log,
}

impl Recorder {
    fn new(name: &str, capabilities: Capabilities, fault: Fault, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            capabilities,
            fault,
            log: Rc::clone(log),
        }
    }

    fn record(&mut self, what: &str) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:{}", self.name, what));
        match self.fault {
            Fault::None => Ok(()),
            Fault::Error => Err(Error::module(&self.name, "refused")),
            Fault::Panic => panic!("{} exploded", self.name),
        }
    }
}

impl BusModule for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn receive(&mut self, _envelope: &Envelope) -> Result<()> {
        self.record("receive")
    }

    fn update(&mut self, _envelope: &Envelope) -> Result<()> {
        self.record("update")
    }
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

// ===========================================================================
// Fan-out and isolation
// ===========================================================================

#[test]
fn erroring_module_does_not_block_others() {
    let log = new_log();
    let mut bus = MessageBus::default();
    bus.add_module(Recorder::new("one", Capabilities::BOTH, Fault::None, &log));
    bus.add_module(Recorder::new("two", Capabilities::BOTH, Fault::Error, &log));
    bus.add_module(Recorder::new("three", Capabilities::BOTH, Fault::None, &log));

    let delivery = bus.transmit(json!({"hello": "world"}));

    assert_eq!(*log.borrow(), ["one:receive", "two:receive", "three:receive"]);
    assert_eq!(delivery.delivered, 2);
    assert_eq!(delivery.failures.len(), 1);
    assert_eq!(delivery.failures[0].index, 1);
    assert_eq!(delivery.failures[0].name, "two");
    assert!(delivery.failures[0].message.contains("refused"));
    assert!(!delivery.is_clean());
}

#[test]
fn panicking_module_is_contained() {
    let log = new_log();
    let mut bus = MessageBus::default();
    bus.add_module(Recorder::new("one", Capabilities::BOTH, Fault::None, &log));
    bus.add_module(Recorder::new("two", Capabilities::BOTH, Fault::Panic, &log));
    bus.add_module(Recorder::new("three", Capabilities::BOTH, Fault::None, &log));

    let delivery = bus.transmit(json!({}));

    let calls = log.borrow();
    assert_eq!(calls.iter().filter(|c| c.as_str() == "one:receive").count(), 1);
    assert_eq!(calls.iter().filter(|c| c.as_str() == "three:receive").count(), 1);
    assert_eq!(delivery.delivered, 2);
    assert!(delivery.failures[0].message.contains("two exploded"));
}

#[test]
fn delivery_follows_registration_order() {
    let log = new_log();
    let mut bus = MessageBus::default();
    for name in ["c", "a", "b"] {
        bus.add_module(Recorder::new(name, Capabilities::BOTH, Fault::None, &log));
    }
    bus.broadcast_update(json!({}));
    assert_eq!(*log.borrow(), ["c:update", "a:update", "b:update"]);
    assert_eq!(bus.module_names(), ["c", "a", "b"]);
}

#[test]
fn capabilities_gate_delivery() {
    let log = new_log();
    let mut bus = MessageBus::default();
    bus.add_module(Recorder::new("listener", Capabilities::RECEIVE, Fault::None, &log));
    bus.add_module(Recorder::new("tuner", Capabilities::UPDATE, Fault::None, &log));
    bus.add_module(Recorder::new("mute", Capabilities::NONE, Fault::None, &log));

    let sent = bus.transmit(json!({}));
    let updated = bus.broadcast_update(json!({}));

    assert_eq!(*log.borrow(), ["listener:receive", "tuner:update"]);
    assert_eq!((sent.delivered, sent.skipped), (1, 2));
    assert_eq!((updated.delivered, updated.skipped), (1, 2));
}

#[test]
fn removed_modules_stop_receiving() {
    let log = new_log();
    let mut bus = MessageBus::default();
    let first = bus.add_module(Recorder::new("first", Capabilities::BOTH, Fault::None, &log));
    bus.add_module(Recorder::new("second", Capabilities::BOTH, Fault::None, &log));

    assert!(bus.remove_module(first));
    assert!(!bus.remove_module(first));
    bus.transmit(json!({}));

    assert_eq!(*log.borrow(), ["second:receive"]);
    assert_eq!(bus.module_count(), 1);
}

#[test]
fn with_modules_registers_in_given_order() {
    let log = new_log();
    let modules: Vec<Box<dyn BusModule>> = vec![
        Box::new(Recorder::new("x", Capabilities::BOTH, Fault::None, &log)),
        Box::new(Recorder::new("y", Capabilities::BOTH, Fault::None, &log)),
    ];
    let mut bus = MessageBus::with_modules(10, modules);
    bus.transmit(json!({}));
    assert_eq!(*log.borrow(), ["x:receive", "y:receive"]);
}

// ===========================================================================
// History
// ===========================================================================

#[test]
fn history_evicts_oldest_after_capacity() {
    let mut bus = MessageBus::default();
    let first = bus.transmit(json!({"n": 0}));
    for n in 1..=500 {
        bus.transmit(json!({"n": n}));
    }

    let history = bus.history();
    assert_eq!(history.len(), 500);
    assert!(history.find(first.correlation_id).is_none());

    let ns: Vec<i64> = history.iter().map(|e| e.payload["n"].as_i64().unwrap()).collect();
    let expected: Vec<i64> = (1..=500).collect();
    assert_eq!(ns, expected);
}

#[test]
fn updates_are_tagged_in_history() {
    let mut bus = MessageBus::new(10);
    bus.transmit(json!({"kind": "stimulus"}));
    let update = bus.broadcast_update(json!({"mode": "social"}));

    let entry = bus.history().find(update.correlation_id).unwrap();
    assert_eq!(entry.kind, MessageKind::Update);
    assert_eq!(serde_json::to_value(entry).unwrap()["type"], "update");
    assert_eq!(bus.history().by_kind(MessageKind::Update).count(), 1);
    assert_eq!(bus.history().by_kind(MessageKind::Transmit).count(), 1);
}

#[test]
fn history_records_even_without_modules() {
    let mut bus = MessageBus::new(3);
    let d = bus.transmit(json!({}));
    assert_eq!(d.delivered, 0);
    assert_eq!(bus.history().latest().unwrap().correlation_id, d.correlation_id);
}

// ===========================================================================
// Evolution iterations
// ===========================================================================

#[test]
fn high_energy_iteration_boosts_and_publishes() {
    let log = new_log();
    let mut bus = MessageBus::default();
    bus.add_module(Recorder::new("watcher", Capabilities::RECEIVE, Fault::None, &log));

    let core = CoreState::default().with_energy(90.0);
    let mut identity = IdentityEvolution::new("selph");
    let outcome = bus.run_iteration(&core, &mut identity);

    assert!(outcome.report.success);
    assert!(outcome.report.evolved);
    assert_eq!(outcome.report.proposal, "boost");
    assert_eq!(outcome.report.version, Version::new(1, 0, 1));
    assert_eq!(outcome.delivery.delivered, 1);

    let entry = bus.history().latest().unwrap();
    assert_eq!(entry.kind, MessageKind::EvolutionIteration);
    assert_eq!(entry.payload["success"], true);
    assert_eq!(entry.payload["identity"], "selph+boost");
    assert_eq!(*log.borrow(), ["watcher:receive"]);
}

#[test]
fn low_energy_iteration_fails_but_restores_identity() {
    let mut bus = MessageBus::default();
    let core = CoreState::default().with_energy(3.0);
    let mut identity = IdentityEvolution::new("selph");
    let outcome = bus.run_iteration(&core, &mut identity);

    assert!(!outcome.report.success);
    assert!(outcome.report.evolved);
    assert_eq!(identity.identity(), "selph+restore");
}

#[test]
fn maintain_iteration_leaves_version_alone() {
    let mut bus = MessageBus::default();
    let core = CoreState::default().with_energy(50.0);
    let mut identity = IdentityEvolution::new("selph");
    let outcome = bus.run_iteration(&core, &mut identity);

    assert!(outcome.report.success);
    assert!(!outcome.report.evolved);
    assert_eq!(outcome.report.proposal, "maintain");
    assert_eq!(identity.version(), Version::new(1, 0, 0));
    assert!(identity.history().is_empty());
}

// ===========================================================================
// Shared modules and component adapters
// ===========================================================================

#[test]
fn shared_core_state_receives_signals() {
    let core = Rc::new(RefCell::new(CoreState::default()));
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&core)));

    bus.transmit(json!({"name": "ping", "strength": 0.7}));
    bus.broadcast_update(json!({"deepen": 1.5}));

    let core = core.borrow();
    assert_eq!(core.memory().len(), 1);
    assert_eq!(core.energy(), 99.0);
    assert_eq!(core.depth(), 1.5);
}

#[test]
fn busy_shared_module_is_isolated() {
    let core = Rc::new(RefCell::new(CoreState::default()));
    let log = new_log();
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&core)));
    bus.add_module(Recorder::new("after", Capabilities::BOTH, Fault::None, &log));

    let guard = core.borrow_mut();
    let delivery = bus.transmit(json!({"name": "ping"}));
    drop(guard);

    assert_eq!(delivery.failures.len(), 1);
    assert_eq!(delivery.failures[0].name, "core_state");
    assert!(delivery.failures[0].message.contains("busy"));
    assert_eq!(*log.borrow(), ["after:receive"]);
    assert!(core.borrow().memory().is_empty());
}

#[test]
fn system_state_accepts_mode_and_filter_updates() {
    let os = Rc::new(RefCell::new(SelphOs::new(PerceptionFilterChain::default(), Some(3))));
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&os)));

    let ok = bus.broadcast_update(json!({"mode": "social"}));
    assert!(ok.is_clean());
    assert_eq!(os.borrow().state().mode, Mode::Social);

    bus.broadcast_update(json!({"filter": "logic", "active": false, "intensity": 2.0}));
    let logic = os.borrow().filters().get("logic").cloned().unwrap();
    assert!(!logic.active);
    assert_eq!(logic.intensity, 1.0);

    let bad = bus.broadcast_update(json!({"mode": "dreaming"}));
    assert!(bad.failures[0].message.contains("unknown mode"));
    assert_eq!(os.borrow().state().mode, Mode::Social);
}

#[test]
fn identity_and_peers_accept_updates() {
    let identity = Rc::new(RefCell::new(IdentityEvolution::new("selph")));
    let peers = Rc::new(RefCell::new(PeerRegistry::new()));
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&identity)));
    bus.add_module(Shared::new(Rc::clone(&peers)));

    bus.broadcast_update(json!({"identity": "nova", "reason": "renamed"}));
    bus.broadcast_update(json!({"peer": "echo", "shared_intelligence": {"insight": 7}}));
    bus.transmit(json!({"peer": "delta"}));
    // no identity key: nothing to mutate
    bus.broadcast_update(json!({"unrelated": true}));

    let identity = identity.borrow();
    assert_eq!(identity.identity(), "nova");
    assert_eq!(identity.history().len(), 1);
    assert_eq!(identity.history()[0].reason.as_deref(), Some("renamed"));

    let peers = peers.borrow();
    let ids: Vec<&str> = peers.connections().collect();
    assert_eq!(ids, ["delta", "echo"]);
    assert_eq!(peers.shared_intelligence().unwrap()["insight"], 7);
}
