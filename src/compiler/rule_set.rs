//! The compiled, immutable form of a rule-set.

use crate::builder::Body;
use crate::core::{Event, EventName, RuleSetId, StateName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Table entry: which rule-set owns a transition and where it may lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub owner: RuleSetId,
    pub destinations: BTreeSet<StateName>,
}

/// Key of the documentation map.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocKey {
    Transition(StateName, Event),
    Event(EventName),
}

/// Transition table keyed by `(state, event)`.
pub type Table = BTreeMap<(StateName, Event), TransitionInfo>;

/// A compiled rule-set.
///
/// Built once by [`compile`](crate::compiler::compile) and never mutated
/// afterwards; share it behind an `Arc`.
pub struct RuleSet {
    pub(crate) id: RuleSetId,
    pub(crate) table: Table,
    pub(crate) bypasses: BTreeMap<EventName, RuleSetId>,
    pub(crate) docs: BTreeMap<DocKey, Option<String>>,
    pub(crate) states: BTreeSet<StateName>,
    pub(crate) transition_bodies: BTreeMap<(StateName, Event), Body>,
    pub(crate) bypass_bodies: BTreeMap<EventName, Body>,
}

impl RuleSet {
    pub fn id(&self) -> &RuleSetId {
        &self.id
    }

    /// `(state, event) -> (owner, destinations)`.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// `event -> owner` for state-independent handlers.
    pub fn bypasses(&self) -> &BTreeMap<EventName, RuleSetId> {
        &self.bypasses
    }

    pub fn docs(&self) -> &BTreeMap<DocKey, Option<String>> {
        &self.docs
    }

    pub fn doc(&self, key: &DocKey) -> Option<&str> {
        self.docs.get(key).and_then(|doc| doc.as_deref())
    }

    /// Every state named by a declaration head or a destination.
    pub fn states(&self) -> &BTreeSet<StateName> {
        &self.states
    }

    pub fn transition_body(&self, state: &StateName, event: &Event) -> Option<&Body> {
        self.transition_bodies.get(&(state.clone(), event.clone()))
    }

    pub fn bypass_body(&self, event: &EventName) -> Option<&Body> {
        self.bypass_bodies.get(event)
    }

    /// Destinations reachable in one transition from each state.
    pub fn graph(&self) -> BTreeMap<StateName, BTreeSet<StateName>> {
        graph_of(&self.table)
    }

    /// States reachable from `start` through declared transitions, `start`
    /// included. Bypasses are not followed since they carry no destinations.
    pub fn reachable_from(&self, start: &StateName) -> BTreeSet<StateName> {
        reachable(&self.graph(), start)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("id", &self.id)
            .field("table", &self.table)
            .field("bypasses", &self.bypasses)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

pub(crate) fn graph_of(table: &Table) -> BTreeMap<StateName, BTreeSet<StateName>> {
    let mut graph: BTreeMap<StateName, BTreeSet<StateName>> = BTreeMap::new();
    for ((state, _), info) in table {
        graph
            .entry(state.clone())
            .or_default()
            .extend(info.destinations.iter().cloned());
    }
    graph
}

pub(crate) fn reachable(
    graph: &BTreeMap<StateName, BTreeSet<StateName>>,
    start: &StateName,
) -> BTreeSet<StateName> {
    let mut seen = BTreeSet::from([start.clone()]);
    let mut frontier = vec![start.clone()];
    while let Some(state) = frontier.pop() {
        for next in graph.get(&state).into_iter().flatten() {
            if seen.insert(next.clone()) {
                frontier.push(next.clone());
            }
        }
    }
    seen
}
