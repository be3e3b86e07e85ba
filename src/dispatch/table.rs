//! Union of the tables of several rule-sets.

use crate::compiler::{graph_of, reachable, RuleSet, Table, TransitionInfo};
use crate::core::{Event, EventName, RuleSetId, StateName};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Transition and bypass maps merged across rule-sets.
///
/// Rule-sets are merged in order; on a key collision the later one wins.
/// Entries keep a handle on the owning rule-set so its body can be found.
#[derive(Clone, Debug, Default)]
pub struct MergedTable {
    transitions: BTreeMap<(StateName, Event), Arc<RuleSet>>,
    bypasses: BTreeMap<EventName, Arc<RuleSet>>,
}

impl MergedTable {
    pub fn merge(rule_sets: &[Arc<RuleSet>]) -> Self {
        let mut merged = Self::default();
        for rule_set in rule_sets {
            for key in rule_set.table().keys() {
                merged.transitions.insert(key.clone(), Arc::clone(rule_set));
            }
            for event in rule_set.bypasses().keys() {
                merged.bypasses.insert(event.clone(), Arc::clone(rule_set));
            }
        }
        merged
    }

    /// Number of `(state, event)` transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Owner and destinations of the transition at `(state, event)`.
    pub fn transition(&self, state: &StateName, event: &Event) -> Option<(&Arc<RuleSet>, &TransitionInfo)> {
        let key = (state.clone(), event.clone());
        let owner = self.transitions.get(&key)?;
        owner.table().get(&key).map(|info| (owner, info))
    }

    pub fn bypass(&self, event: &EventName) -> Option<&Arc<RuleSet>> {
        self.bypasses.get(event)
    }

    /// Events with a transition at `state`, named events first, wildcard last.
    pub fn events_at(&self, state: &StateName) -> Vec<&Event> {
        self.transitions
            .keys()
            .filter(|(s, _)| s == state)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn bypass_events(&self) -> impl Iterator<Item = &EventName> {
        self.bypasses.keys()
    }

    /// The merged table in its declared shape.
    pub fn table(&self) -> Table {
        self.transitions
            .iter()
            .filter_map(|(key, owner)| {
                owner
                    .table()
                    .get(key)
                    .map(|info| (key.clone(), info.clone()))
            })
            .collect()
    }

    /// The merged bypass map in its declared shape.
    pub fn bypass_map(&self) -> BTreeMap<EventName, RuleSetId> {
        self.bypasses
            .iter()
            .map(|(event, owner)| (event.clone(), owner.id().clone()))
            .collect()
    }

    pub fn graph(&self) -> BTreeMap<StateName, BTreeSet<StateName>> {
        graph_of(&self.table())
    }

    pub fn reachable_from(&self, start: &StateName) -> BTreeSet<StateName> {
        reachable(&self.graph(), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{simple_transition, Body, BypassBuilder, RuleSetBuilder};

    fn rule_set(id: &str, transitions: &[(&str, &str, &str)]) -> Arc<RuleSet> {
        let builder = transitions
            .iter()
            .fold(RuleSetBuilder::new(id), |builder, (from, event, to)| {
                builder.transition(simple_transition(*from, *event, *to))
            });
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn disjoint_tables_add_up() {
        let a = rule_set("a", &[("s1", "go", "s2"), ("s2", "go", "s3")]);
        let b = rule_set("b", &[("s3", "go", "s1")]);

        let merged = MergedTable::merge(&[a, b]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn later_rule_set_wins_collisions() {
        let a = rule_set("a", &[("s1", "go", "from_a")]);
        let b = rule_set("b", &[("s1", "go", "from_b")]);

        let merged = MergedTable::merge(&[a, b]);
        let (owner, info) = merged
            .transition(&StateName::from("s1"), &Event::named("go"))
            .unwrap();

        assert_eq!(owner.id(), &RuleSetId::from("b"));
        assert_eq!(info.owner, RuleSetId::from("b"));
        assert!(info.destinations.contains(&StateName::from("from_b")));
        assert_eq!(merged.table().len(), 1);
    }

    #[test]
    fn bypasses_merge_by_event() {
        let a = Arc::new(
            RuleSetBuilder::new("a")
                .bypass(BypassBuilder::new().on("c").body(Body::next_state("locked")))
                .build()
                .unwrap(),
        );
        let b = Arc::new(
            RuleSetBuilder::new("b")
                .bypass(BypassBuilder::new().on("c").body(Body::keep_state()))
                .bypass(BypassBuilder::new().on("d").body(Body::keep_state()))
                .build()
                .unwrap(),
        );

        let merged = MergedTable::merge(&[a, b]);
        let map = merged.bypass_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&EventName::from("c")], RuleSetId::from("b"));
    }

    #[test]
    fn events_at_lists_wildcard_last() {
        let lock = Arc::new(
            RuleSetBuilder::new("lock")
                .transition(simple_transition("locked", "one", "one"))
                .transition(
                    crate::builder::TransitionBuilder::new()
                        .from("locked")
                        .on_any()
                        .body(Body::keep_state()),
                )
                .build()
                .unwrap(),
        );

        let merged = MergedTable::merge(&[lock]);
        let events = merged.events_at(&StateName::from("locked"));
        assert_eq!(events, vec![&Event::named("one"), &Event::Any]);
    }

    #[test]
    fn merged_graph_spans_rule_sets() {
        let a = rule_set("a", &[("s1", "go", "s2")]);
        let b = rule_set("b", &[("s2", "go", "s3")]);

        let merged = MergedTable::merge(&[a, b]);
        assert_eq!(merged.reachable_from(&StateName::from("s1")).len(), 3);
    }
}
