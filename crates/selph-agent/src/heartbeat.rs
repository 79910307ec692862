//! Heartbeat — drives an agent on a fixed cadence
//!
//! The agent sits behind a tokio mutex so a host may share it with other
//! tasks; each tick holds the lock for one step plus one evolution check.

use crate::facade::AgentFacade;
use selph_core::{PresenceRecord, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

pub type SharedAgent = Arc<Mutex<AgentFacade>>;

pub struct Heartbeat {
    interval: Duration,
    max_ticks: Option<u64>,
}

impl Heartbeat {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Stop after `ticks` beats instead of running until ctrl-c.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Tick until the tick budget runs out or ctrl-c arrives. Returns ticks run.
    pub async fn run<F>(&self, agent: SharedAgent, mut on_tick: F) -> Result<u64>
    where
        F: FnMut(&PresenceRecord),
    {
        let mut interval = tokio::time::interval(self.interval);
        let mut ticks = 0u64;

        loop {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Heartbeat interrupted after {} ticks", ticks);
                    break;
                }
            }

            let presence = {
                let mut agent = agent.lock().await;
                let stimulus = agent.heartbeat_stimulus();
                let presence = agent.step(&stimulus);
                agent.auto_evolve();
                presence
            };
            ticks += 1;
            on_tick(&presence);
        }

        Ok(ticks)
    }
}
