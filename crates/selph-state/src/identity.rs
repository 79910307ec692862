//! IdentityEvolution — versioned identity with an append-only mutation log
//!
//! Every accepted mutation bumps the patch version by exactly one. Major and
//! minor are never touched automatically.

use chrono::{DateTime, Utc};
use selph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

pub const BOOST_THRESHOLD: f64 = 80.0;
pub const RESTORE_THRESHOLD: f64 = 20.0;

const BOOST_SUFFIX: &str = "+boost";
const RESTORE_SUFFIX: &str = "+restore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    fn bump_patch(&mut self) {
        self.patch += 1;
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidVersion(s.to_string()));
        }
        let parse = |p: &str| p.parse::<u64>().map_err(|_| Error::InvalidVersion(s.to_string()));
        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationLogEntry {
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of weighing the current energy against the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    Boost(String),
    Restore(String),
    Maintain,
}

impl Proposal {
    pub fn label(&self) -> &'static str {
        match self {
            Proposal::Boost(_) => "boost",
            Proposal::Restore(_) => "restore",
            Proposal::Maintain => "maintain",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    pub version: Version,
    pub identity: String,
    pub mutation_count: usize,
    pub last_mutation: Option<MutationLogEntry>,
    pub log_started: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IdentityEvolution {
    version: Version,
    identity: String,
    mutation_log: Vec<MutationLogEntry>,
    log_started: DateTime<Utc>,
}

impl IdentityEvolution {
    pub fn new(identity: impl Into<String>) -> Self {
        Self::from_parts(identity, Version::default())
    }

    /// Resume from a known version, e.g. one read back from a presence record.
    pub fn from_parts(identity: impl Into<String>, version: Version) -> Self {
        Self {
            version,
            identity: identity.into(),
            mutation_log: Vec::new(),
            log_started: Utc::now(),
        }
    }

    /// Pure function of energy: >80 boosts, <20 restores, anything else maintains.
    pub fn propose_mutation(&self, energy: f64) -> Proposal {
        if energy > BOOST_THRESHOLD {
            Proposal::Boost(format!("{}{}", self.base_identity(), BOOST_SUFFIX))
        } else if energy < RESTORE_THRESHOLD {
            Proposal::Restore(format!("{}{}", self.base_identity(), RESTORE_SUFFIX))
        } else {
            Proposal::Maintain
        }
    }

    /// Apply whatever `propose_mutation` suggests. Returns true if the identity mutated.
    pub fn evolve(&mut self, energy: f64) -> bool {
        let proposal = self.propose_mutation(energy);
        let label = proposal.label();
        let identity = match proposal {
            Proposal::Boost(id) | Proposal::Restore(id) => id,
            Proposal::Maintain => return false,
        };
        self.mutate(identity, Some(format!("{} at energy {:.1}", label, energy)));
        true
    }

    /// Record and apply a new identity. Never fails; content is not validated.
    pub fn mutate(&mut self, new_identity: impl Into<String>, reason: Option<String>) {
        let new_identity = new_identity.into();
        self.mutation_log.push(MutationLogEntry {
            from: self.identity.clone(),
            to: new_identity.clone(),
            timestamp: Utc::now(),
            reason,
        });
        self.identity = new_identity;
        self.version.bump_patch();
        info!("Identity mutated to {} (v{})", self.identity, self.version);
    }

    pub fn stats(&self) -> EvolutionStats {
        EvolutionStats {
            version: self.version,
            identity: self.identity.clone(),
            mutation_count: self.mutation_log.len(),
            last_mutation: self.mutation_log.last().cloned(),
            log_started: self.log_started,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn history(&self) -> &[MutationLogEntry] {
        &self.mutation_log
    }

    fn base_identity(&self) -> &str {
        self.identity
            .strip_suffix(BOOST_SUFFIX)
            .or_else(|| self.identity.strip_suffix(RESTORE_SUFFIX))
            .unwrap_or(&self.identity)
    }
}
