//! AgentFacade — the one externally addressable unit
//!
//! Composes the system-state module, core state, identity evolution, peer
//! registry and the expression boundary. Everything is injected at
//! construction; nothing is reached through globals.

use crate::config::AgentConfig;
use crate::expression::{modulate, Expression, TracingExpression};
use selph_bus::{BusModule, Capabilities};
use selph_core::{
    Clock, ConsciousnessRecord, Emotion, Envelope, Intent, MessageKind, PresenceRecord, Result,
    Signal, SystemClock,
};
use selph_state::{
    CoreState, Decider, Decision, EvolutionStats, IdentityEvolution, PeerRegistry, ProcessOutcome,
    SelphOs, SelphOsState, Version,
};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Spread of the synthetic heartbeat strength around 0.5.
const HEARTBEAT_SPREAD: f64 = 0.5;

/// Components an agent is assembled from.
pub struct AgentParts {
    pub system: SelphOs,
    pub core: CoreState,
    pub identity: IdentityEvolution,
    pub peers: PeerRegistry,
    pub expression: Box<dyn Expression>,
    pub clock: Box<dyn Clock>,
}

/// Identity fields cached for presence records, refreshed after each mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityCard {
    pub identity: String,
    pub version: Version,
}

pub struct AgentFacade {
    system: SelphOs,
    core: CoreState,
    identity: IdentityEvolution,
    peers: PeerRegistry,
    expression: Box<dyn Expression>,
    clock: Box<dyn Clock>,
    card: IdentityCard,
    last_presence: Option<PresenceRecord>,
}

impl AgentFacade {
    pub fn new(parts: AgentParts) -> Self {
        let card = IdentityCard {
            identity: parts.identity.identity().to_string(),
            version: parts.identity.version(),
        };
        Self {
            system: parts.system,
            core: parts.core,
            identity: parts.identity,
            peers: parts.peers,
            expression: parts.expression,
            clock: parts.clock,
            card,
            last_presence: None,
        }
    }

    /// Assemble an agent from config with the system clock and log-based expression.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        let core = CoreState::new(config.memory.signal_capacity, config.memory.energy_drain)
            .with_energy(config.memory.initial_energy);
        Ok(Self::new(AgentParts {
            system: SelphOs::new(config.perception.to_chain(), config.runtime.seed),
            core,
            identity: IdentityEvolution::from_parts(&config.identity.name, config.version()?),
            peers: PeerRegistry::new(),
            expression: Box::new(TracingExpression),
            clock: Box::new(SystemClock),
        }))
    }

    pub fn with_expression(mut self, expression: Box<dyn Expression>) -> Self {
        self.expression = expression;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// One externally visible tick. Mode and tone follow the clock's hour.
    pub fn step(&mut self, stimulus: &Value) -> PresenceRecord {
        self.system.adapt_to_environment(self.clock.hour());
        let config = self.system.configuration();

        let signal = Signal::from_stimulus(stimulus);
        let source = signal.name.clone();
        let snapshot = self.core.process(signal);

        let record = ConsciousnessRecord {
            intent: Intent::from_energy(snapshot.energy),
            emotion: Emotion::from_tone(config.tone),
            source,
        };

        let presence = PresenceRecord {
            identity: self.card.identity.clone(),
            style: modulate(record.emotion, snapshot.energy),
            status: snapshot.presence.as_str().to_string(),
            timestamp: self.clock.now(),
            intent: record.intent,
            energy: snapshot.energy,
        };
        self.expression.express(&record, &presence);

        debug!(
            "Step in {} mode: {} → {} ({})",
            config.mode, record.source, record.intent, presence.style
        );
        self.last_presence = Some(presence.clone());
        presence
    }

    /// Run the full perception cycle and return the snapshot record.
    pub fn perceive(&mut self, input: &Value) -> ProcessOutcome {
        let mut decider = CoreDecider {
            core: &mut self.core,
            identity: &self.identity,
        };
        self.system.process_input(input, self.clock.as_ref(), &mut decider)
    }

    pub fn evolve(&mut self, new_identity: impl Into<String>, reason: Option<String>) -> Version {
        self.identity.mutate(new_identity, reason);
        self.refresh_card();
        self.card.version
    }

    /// Let the current energy decide. Returns true if the identity mutated.
    pub fn auto_evolve(&mut self) -> bool {
        let evolved = self.identity.evolve(self.core.energy());
        if evolved {
            self.refresh_card();
        }
        evolved
    }

    pub fn restore(&mut self, amount: f64) {
        self.core.restore(amount);
    }

    pub fn deepen_focus(&mut self, amount: f64) {
        self.core.deepen_focus(amount);
    }

    /// The first peer turns the agent's presence distributed.
    pub fn connect_peer(&mut self, peer_id: impl Into<String>) -> bool {
        let added = self.peers.register_connection(peer_id);
        if added && self.peers.connection_count() == 1 {
            self.core.distribute();
        }
        added
    }

    pub fn integrate(&mut self, payload: Value) {
        self.peers.integrate(payload);
    }

    /// Synthetic stimulus for idle ticks, strength jittered from the seeded source.
    pub fn heartbeat_stimulus(&mut self) -> Value {
        let strength = 0.5 + self.system.jitter(HEARTBEAT_SPREAD);
        json!({ "type": "heartbeat", "strength": strength })
    }

    fn refresh_card(&mut self) {
        self.card = IdentityCard {
            identity: self.identity.identity().to_string(),
            version: self.identity.version(),
        };
        info!("Agent is now {} v{}", self.card.identity, self.card.version);
    }

    pub fn card(&self) -> &IdentityCard {
        &self.card
    }

    pub fn last_presence(&self) -> Option<&PresenceRecord> {
        self.last_presence.as_ref()
    }

    pub fn stats(&self) -> EvolutionStats {
        self.identity.stats()
    }

    pub fn system(&self) -> &SelphOs {
        &self.system
    }

    pub fn core(&self) -> &CoreState {
        &self.core
    }

    pub fn identity(&self) -> &IdentityEvolution {
        &self.identity
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }
}

/// Decides intent from core energy after feeding it the filtered input.
struct CoreDecider<'a> {
    core: &'a mut CoreState,
    identity: &'a IdentityEvolution,
}

impl Decider for CoreDecider<'_> {
    fn decide(&mut self, filtered: &Value, _state: &SelphOsState) -> Decision {
        let signal = Signal::from_stimulus(filtered);
        let source = signal.name.clone();
        let energy = self.core.process(signal).energy;
        Decision {
            intent: Intent::from_energy(energy),
            proposal: self.identity.propose_mutation(energy).label().to_string(),
            energy,
            source,
        }
    }
}

impl BusModule for AgentFacade {
    fn name(&self) -> &str {
        "agent"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    /// Stimuli become ticks. Evolution reports are the agent's own echo and are skipped.
    fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        if envelope.kind != MessageKind::EvolutionIteration {
            self.step(&envelope.payload);
        }
        Ok(())
    }

    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = &envelope.payload;
        if let Some(identity) = payload.get("identity").and_then(Value::as_str) {
            let reason = payload.get("reason").and_then(Value::as_str).map(String::from);
            self.evolve(identity, reason);
        }
        if let Some(peer) = payload.get("peer").and_then(Value::as_str) {
            self.connect_peer(peer);
        }
        if let Some(intelligence) = payload.get("shared_intelligence") {
            self.integrate(intelligence.clone());
        }
        self.core.update(envelope)?;
        self.system.update(envelope)
    }
}
