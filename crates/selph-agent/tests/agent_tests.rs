//! Tests for selph-agent: facade ticks, evolution, peers, config, heartbeat

use selph_agent::*;
use selph_bus::{BusModule, MessageBus, Shared};
use selph_core::{
    ConsciousnessRecord, DayPeriod, Emotion, Envelope, Error, FixedClock, Intent, MessageKind,
    Mode, PresenceRecord, Tone,
};
use selph_state::{
    CoreState, IdentityEvolution, PeerRegistry, PerceptionFilterChain, SelphOs, Version,
};
use serde_json::json;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn agent_at(energy: f64, hour: u32) -> AgentFacade {
    AgentFacade::new(AgentParts {
        system: SelphOs::new(PerceptionFilterChain::default(), Some(1)),
        core: CoreState::default().with_energy(energy),
        identity: IdentityEvolution::new("selph"),
        peers: PeerRegistry::new(),
        expression: Box::new(NullExpression),
        clock: Box::new(FixedClock::at_hour(hour)),
    })
}

type Seen = Arc<Mutex<Vec<(ConsciousnessRecord, PresenceRecord)>>>;

struct RecordingExpression(Seen);

impl Expression for RecordingExpression {
    fn express(&mut self, record: &ConsciousnessRecord, presence: &PresenceRecord) {
        self.0.lock().unwrap().push((record.clone(), presence.clone()));
    }
}

// ===========================================================================
// step
// ===========================================================================

#[test]
fn step_intent_follows_drained_energy() {
    // one unit of drain per step
    for (start, expected) in [
        (86.0, Intent::Create),
        (56.0, Intent::Explore),
        (26.0, Intent::Conserve),
        (6.0, Intent::Restore),
        (81.0, Intent::Explore),
    ] {
        let mut agent = agent_at(start, 12);
        let presence = agent.step(&json!({"name": "poke", "strength": 0.4}));
        assert_eq!(presence.intent, expected, "start energy {}", start);
        assert_eq!(presence.energy, start - 1.0);
    }
}

#[test]
fn step_presence_carries_style_and_status() {
    let mut agent = agent_at(100.0, 12);
    let presence = agent.step(&json!({"name": "hello"}));
    assert_eq!(presence.identity, "selph");
    assert_eq!(presence.style, "determined/vivid");
    assert_eq!(presence.status, "active");

    let mut tired = agent_at(10.0, 12);
    let presence = tired.step(&json!({"name": "hello"}));
    assert_eq!(presence.style, "determined/faint");
    assert_eq!(presence.status, "dormant");
}

#[test]
fn step_follows_the_clock_hour() {
    for (hour, mode, style) in [
        (3, Mode::Intuitive, "serene/vivid"),
        (12, Mode::Logical, "determined/vivid"),
        (20, Mode::Creative, "joyful/vivid"),
    ] {
        let mut agent = agent_at(100.0, hour);
        let presence = agent.step(&json!({"name": "x", "strength": 0.5}));
        assert_eq!(presence.style, style, "hour {}", hour);
        assert_eq!(agent.system().state().mode, mode);
        assert_eq!(agent.system().state().environment.hour, hour);
    }
}

#[test]
fn step_hands_both_records_to_expression() {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let mut agent = agent_at(100.0, 12).with_expression(Box::new(RecordingExpression(seen.clone())));

    let presence = agent.step(&json!({"type": "touch", "strength": 0.9}));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (record, expressed) = &seen[0];
    assert_eq!(record.source, "touch");
    assert_eq!(record.emotion, Emotion::Determined);
    assert_eq!(record.intent, Intent::Create);
    assert_eq!(expressed.timestamp, presence.timestamp);
    assert_eq!(agent.last_presence().unwrap().energy, 99.0);
}

#[test]
fn step_records_signal_in_core_memory() {
    let mut agent = agent_at(100.0, 12);
    agent.step(&json!({"name": "a", "strength": 0.2}));
    agent.step(&json!({"name": "b", "strength": 0.9}));
    assert_eq!(agent.core().memory().len(), 2);
    assert_eq!(agent.core().memory().strongest().unwrap().name, "b");
}

// ===========================================================================
// Evolution
// ===========================================================================

#[test]
fn evolve_refreshes_identity_card() {
    let mut agent = agent_at(100.0, 12);
    let version = agent.evolve("nova", Some("renamed".into()));
    assert_eq!(version, Version::new(1, 0, 1));
    assert_eq!(agent.card().identity, "nova");

    let presence = agent.step(&json!({}));
    assert_eq!(presence.identity, "nova");
}

#[test]
fn auto_evolve_follows_energy() {
    let mut high = agent_at(95.0, 12);
    assert!(high.auto_evolve());
    assert_eq!(high.card().identity, "selph+boost");
    // boosting again swaps the suffix, it does not stack
    assert!(high.auto_evolve());
    assert_eq!(high.card().identity, "selph+boost");
    assert_eq!(high.stats().mutation_count, 2);

    let mut low = agent_at(5.0, 12);
    assert!(low.auto_evolve());
    assert_eq!(low.card().identity, "selph+restore");

    let mut mid = agent_at(50.0, 12);
    assert!(!mid.auto_evolve());
    assert_eq!(mid.card().version, Version::new(1, 0, 0));
}

// ===========================================================================
// perceive
// ===========================================================================

#[test]
fn perceive_at_night_turns_intuitive() {
    let mut agent = agent_at(100.0, 23);
    let outcome = agent.perceive(&json!({"name": "dream", "strength": 0.6, "sentiment": 0.5}));

    let state = &outcome.snapshot.state;
    assert_eq!(state.mode, Mode::Intuitive);
    assert_eq!(state.tone, Tone::Calm);
    assert_eq!(state.environment.hour, 23);
    assert_eq!(state.environment.period, DayPeriod::Night);

    assert_eq!(outcome.snapshot.decision.source, "dream");
    assert_eq!(outcome.snapshot.decision.intent, Intent::Create);
    assert_eq!(outcome.snapshot.decision.proposal, "boost");
    assert!(outcome.filtered.get("perceived").is_some());
    assert_eq!(outcome.input["name"], "dream");

    let intuition = outcome.snapshot.filters.iter().find(|f| f.name.as_str() == "intuition").unwrap();
    assert_eq!(intuition.intensity, 1.0);
    assert_eq!(agent.core().energy(), 99.0);
}

#[test]
fn perceive_is_reproducible_with_same_seed() {
    let mut a = agent_at(100.0, 10);
    let mut b = agent_at(100.0, 10);
    for n in 0..5 {
        let input = json!({"name": "tick", "strength": n as f64 / 5.0});
        let x = a.perceive(&input);
        let y = b.perceive(&input);
        assert_eq!(x.snapshot.state.adaptation_level, y.snapshot.state.adaptation_level);
    }
    let level = a.system().state().adaptation_level;
    assert!((0.0..=1.0).contains(&level));
}

// ===========================================================================
// Peers
// ===========================================================================

#[test]
fn first_peer_distributes_presence() {
    let mut agent = agent_at(100.0, 12);
    assert!(agent.connect_peer("echo"));
    assert!(!agent.connect_peer("echo"));
    assert!(agent.connect_peer("delta"));
    assert_eq!(agent.peers().connection_count(), 2);

    let presence = agent.step(&json!({}));
    assert_eq!(presence.status, "distributed");

    agent.integrate(json!({"insight": "shared"}));
    assert_eq!(agent.peers().shared_intelligence().unwrap()["insight"], "shared");
}

#[test]
fn heartbeat_stimulus_stays_in_unit_range() {
    let mut agent = agent_at(100.0, 12);
    for _ in 0..20 {
        let stimulus = agent.heartbeat_stimulus();
        assert_eq!(stimulus["type"], "heartbeat");
        let strength = stimulus["strength"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&strength));
    }
}

// ===========================================================================
// As a bus module
// ===========================================================================

#[test]
fn agent_on_bus_steps_and_updates() {
    let agent = Rc::new(RefCell::new(agent_at(100.0, 12)));
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&agent)));
    assert_eq!(bus.module_names(), ["agent"]);

    bus.transmit(json!({"name": "ping", "strength": 0.5}));
    bus.broadcast_update(json!({
        "identity": "nova",
        "peer": "echo",
        "mode": "social",
        "restore": 5.0,
    }));

    let agent = agent.borrow();
    assert_eq!(agent.last_presence().unwrap().energy, 99.0);
    assert_eq!(agent.card().identity, "nova");
    assert_eq!(agent.peers().connection_count(), 1);
    assert_eq!(agent.system().state().mode, Mode::Social);
    assert_eq!(agent.core().energy(), 100.0);
}

#[test]
fn agent_ignores_its_own_iteration_reports() {
    let agent = Rc::new(RefCell::new(agent_at(100.0, 12)));
    let mut bus = MessageBus::default();
    bus.add_module(Shared::new(Rc::clone(&agent)));

    let core = CoreState::default();
    let mut identity = IdentityEvolution::new("other");
    let outcome = bus.run_iteration(&core, &mut identity);

    assert!(outcome.delivery.is_clean());
    assert!(agent.borrow().last_presence().is_none());
}

#[test]
fn unknown_mode_update_is_reported() {
    let mut agent = agent_at(100.0, 12);
    let envelope = Envelope::new(MessageKind::Update, json!({"mode": "dreaming"}));
    let err = agent.update(&envelope).unwrap_err();
    assert!(matches!(err, Error::UnknownMode(_)));
}

// ===========================================================================
// Expression
// ===========================================================================

#[test]
fn cadence_bands() {
    assert_eq!(Cadence::from_energy(81.0), Cadence::Vivid);
    assert_eq!(Cadence::from_energy(80.0), Cadence::Flowing);
    assert_eq!(Cadence::from_energy(50.0), Cadence::Steady);
    assert_eq!(Cadence::from_energy(20.0), Cadence::Faint);
    assert_eq!(modulate(Emotion::Joyful, 90.0), "joyful/vivid");
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_defaults_are_valid() {
    let config = AgentConfig::default();
    config.validate().unwrap();
    assert_eq!(config.identity.name, "selph");
    assert_eq!(config.version().unwrap(), Version::new(1, 0, 0));
    assert_eq!(config.bus.history_capacity, 500);
}

#[test]
fn config_load_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[identity]\nname = \"nova\"\nversion = \"2.1.0\"\n\n[runtime]\nseed = 7"
    )
    .unwrap();

    let config = AgentConfig::load(file.path());
    assert_eq!(config.identity.name, "nova");
    assert_eq!(config.runtime.seed, Some(7));
    assert_eq!(config.memory.signal_capacity, 50);

    let agent = AgentFacade::from_config(&config).unwrap();
    assert_eq!(agent.card().version, Version::new(2, 1, 0));
    assert_eq!(agent.card().identity, "nova");
}

#[test]
fn config_load_falls_back_on_missing_or_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = AgentConfig::load(&dir.path().join("nope.toml"));
    assert_eq!(missing.identity.name, "selph");

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[identity\nname = ").unwrap();
    let config = AgentConfig::load(&broken);
    assert_eq!(config.identity.name, "selph");
}

#[test]
fn config_validation_rejects_bad_values() {
    let mut config = AgentConfig::default();
    config.identity.version = "1.0".into();
    assert!(matches!(config.validate(), Err(Error::InvalidVersion(_))));
    assert!(AgentFacade::from_config(&config).is_err());

    let mut config = AgentConfig::default();
    config.memory.signal_capacity = 0;
    assert!(matches!(config.validate(), Err(Error::Config(_))));

    let mut config = AgentConfig::default();
    config.memory.energy_drain = f64::NAN;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn config_sizes_message_bus_history() {
    let mut config = AgentConfig::default();
    config.bus.history_capacity = 2;
    let mut bus = config.message_bus();
    for n in 0..4 {
        bus.transmit(json!({"n": n}));
    }
    assert_eq!(bus.history().capacity(), 2);
    assert_eq!(bus.history().len(), 2);
    assert_eq!(bus.history().latest().unwrap().payload["n"], 3);
}

#[test]
fn config_dump_round_trips() {
    let toml = AgentConfig::default().to_toml();
    assert!(toml.contains("[identity]"));
    assert!(toml.contains("heartbeat_ms"));
    let parsed: AgentConfig = toml::from_str(&toml).unwrap();
    assert_eq!(parsed.perception.creativity, 0.9);
}

// ===========================================================================
// Heartbeat
// ===========================================================================

#[tokio::test]
async fn heartbeat_runs_bounded_ticks() {
    let agent: SharedAgent = Arc::new(tokio::sync::Mutex::new(agent_at(100.0, 12)));
    let mut energies = Vec::new();

    let ticks = Heartbeat::new(Duration::from_millis(5))
        .with_max_ticks(3)
        .run(agent.clone(), |presence| energies.push(presence.energy))
        .await
        .unwrap();

    assert_eq!(ticks, 3);
    assert_eq!(energies, [99.0, 98.0, 97.0]);

    let agent = agent.lock().await;
    assert_eq!(agent.card().version, Version::new(1, 0, 3));
    assert_eq!(agent.card().identity, "selph+boost");
}
