//! BusModule implementations for the state components
//!
//! Unknown update keys are ignored, in line with the silent handling of
//! unknown filter names. Only a malformed mode name is reported as an error.

use crate::module::{BusModule, Capabilities};
use selph_core::{number_or_zero, Envelope, Mode, Result, Signal};
use selph_state::{CoreState, IdentityEvolution, PeerRegistry, SelphOs};
use serde_json::Value;

impl BusModule for CoreState {
    fn name(&self) -> &str {
        "core_state"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    /// Every received payload is one signal.
    fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        self.process(Signal::from_stimulus(&envelope.payload));
        Ok(())
    }

    /// `{"restore": n}` and `{"deepen": n}`.
    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = &envelope.payload;
        if payload.get("restore").is_some() {
            self.restore(number_or_zero(payload, "restore"));
        }
        if payload.get("deepen").is_some() {
            self.deepen_focus(number_or_zero(payload, "deepen"));
        }
        Ok(())
    }
}

impl BusModule for SelphOs {
    fn name(&self) -> &str {
        "selph_os"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    /// `{"mode": "..."}` switches mode; `{"filter": name, "active": b, "intensity": x}` tunes one filter.
    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = &envelope.payload;
        if let Some(mode) = payload.get("mode").and_then(Value::as_str) {
            self.switch_mode(mode.parse::<Mode>()?);
        }
        if let Some(filter) = payload.get("filter").and_then(Value::as_str) {
            if let Some(active) = payload.get("active").and_then(Value::as_bool) {
                self.filters_mut().set_active(filter, active);
            }
            if let Some(intensity) = payload.get("intensity").and_then(Value::as_f64) {
                self.filters_mut().set_intensity(filter, intensity);
            }
        }
        Ok(())
    }
}

impl BusModule for IdentityEvolution {
    fn name(&self) -> &str {
        "identity"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    /// `{"identity": "...", "reason": "..."}`.
    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = &envelope.payload;
        if let Some(identity) = payload.get("identity").and_then(Value::as_str) {
            let reason = payload.get("reason").and_then(Value::as_str).map(String::from);
            self.mutate(identity, reason);
        }
        Ok(())
    }
}

impl BusModule for PeerRegistry {
    fn name(&self) -> &str {
        "peers"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    /// A payload carrying `peer` announces a connection.
    fn receive(&mut self, envelope: &Envelope) -> Result<()> {
        if let Some(peer) = envelope.payload.get("peer").and_then(Value::as_str) {
            self.register_connection(peer);
        }
        Ok(())
    }

    /// `{"peer": id}` and/or `{"shared_intelligence": ...}`.
    fn update(&mut self, envelope: &Envelope) -> Result<()> {
        let payload = &envelope.payload;
        if let Some(peer) = payload.get("peer").and_then(Value::as_str) {
            self.register_connection(peer);
        }
        if let Some(intelligence) = payload.get("shared_intelligence") {
            self.integrate(intelligence.clone());
        }
        Ok(())
    }
}
