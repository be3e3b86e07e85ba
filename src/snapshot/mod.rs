//! Serializable export of a compiled rule-set.
//!
//! A snapshot carries the table, bypass map, documentation and state set of a
//! [`RuleSet`]. Bodies are closures and are not part of it, so a snapshot is
//! for inspection, diffing and tooling rather than for reloading handlers.

use crate::compiler::{DocKey, RuleSet};
use crate::core::{Event, EventName, RuleSetId, StateName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// One row of the transition table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRow {
    pub state: StateName,
    pub event: Event,
    pub owner: RuleSetId,
    pub destinations: BTreeSet<StateName>,
}

/// One row of the bypass map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassRow {
    pub event: EventName,
    pub owner: RuleSetId,
}

/// Documentation attached to a transition or bypass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRow {
    pub key: DocKey,
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSetSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,

    /// Rule-set the rows were taken from
    pub rule_set: RuleSetId,

    /// Transition table rows, ordered by `(state, event)`
    pub transitions: Vec<TransitionRow>,

    /// Bypass rows, ordered by event
    pub bypasses: Vec<BypassRow>,

    /// Documentation rows, ordered by key
    pub docs: Vec<DocRow>,

    /// Every state the rule-set mentions
    pub states: BTreeSet<StateName>,
}

impl RuleSetSnapshot {
    pub fn capture(rule_set: &RuleSet) -> Self {
        let transitions = rule_set
            .table()
            .iter()
            .map(|((state, event), info)| TransitionRow {
                state: state.clone(),
                event: event.clone(),
                owner: info.owner.clone(),
                destinations: info.destinations.clone(),
            })
            .collect();
        let bypasses = rule_set
            .bypasses()
            .iter()
            .map(|(event, owner)| BypassRow {
                event: event.clone(),
                owner: owner.clone(),
            })
            .collect();
        let docs = rule_set
            .docs()
            .iter()
            .map(|(key, doc)| DocRow {
                key: key.clone(),
                doc: doc.clone(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            rule_set: rule_set.id().clone(),
            transitions,
            bypasses,
            docs,
            states: rule_set.states().clone(),
        }
    }

    /// True when both snapshots describe the same table, bypasses, docs and
    /// states, regardless of id and timestamp.
    pub fn same_rules(&self, other: &Self) -> bool {
        self.rule_set == other.rule_set
            && self.transitions == other.transitions
            && self.bypasses == other.bypasses
            && self.docs == other.docs
            && self.states == other.states
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            tracing::warn!("rejecting snapshot {} with version {}", self.id, self.version);
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}
