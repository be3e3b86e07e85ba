//! Declaration compiler.
//!
//! Turns the ordered declarations of one rule-set into an immutable
//! [`RuleSet`]: the transition table, the bypass map, the documentation map and
//! the set of every state the declarations mention. Destination states are
//! found by walking each rule body (see the analyzer) unless the declaration
//! names them explicitly.
//!
//! Compilation is all-or-nothing. Every malformed declaration is reported,
//! using Stillwater's `Validation` to accumulate them, and no rule-set is
//! produced when any is found.

mod analyzer;
mod options;
mod rule_set;

pub use options::{ArmPolicy, CompileOptions};
pub use rule_set::{DocKey, RuleSet, Table, TransitionInfo};

pub(crate) use rule_set::{graph_of, reachable};

use crate::builder::{Body, BypassDecl, CompileError, Declaration, DeclarationError, TransitionDecl};
use crate::core::{Event, EventName, RuleSetId, StateName};
use std::collections::{BTreeMap, BTreeSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Errors = NonEmptyVec<DeclarationError>;

enum Compiled {
    Transition {
        state: StateName,
        event: Event,
        body: Body,
        destinations: BTreeSet<StateName>,
        doc: Option<String>,
    },
    Bypass {
        event: EventName,
        body: Body,
        doc: Option<String>,
    },
}

/// Compile declarations into a rule-set.
///
/// Later declarations with the same key replace earlier ones. State names
/// are collected from every declaration, replaced or not.
pub fn compile(
    id: impl Into<RuleSetId>,
    declarations: Vec<Declaration>,
    options: &CompileOptions,
) -> Result<RuleSet, CompileError> {
    let id = id.into();

    let checks: Vec<Validation<Compiled, Errors>> = declarations
        .into_iter()
        .enumerate()
        .map(|(index, declaration)| match declaration {
            Declaration::Transition(decl) => compile_transition(index, decl, options),
            Declaration::Bypass(decl) => compile_bypass(index, decl),
        })
        .collect();

    let compiled = match Validation::all_vec(checks) {
        Validation::Success(compiled) => compiled,
        Validation::Failure(errors) => {
            let error = CompileError {
                rule_set: id.to_string(),
                errors: errors.iter().cloned().collect(),
            };
            tracing::debug!("{}", error);
            return Err(error);
        }
    };

    let rule_set = assemble(id, compiled);
    tracing::debug!(
        "compiled rule-set {}: {} transitions, {} bypasses, {} states",
        rule_set.id,
        rule_set.table.len(),
        rule_set.bypasses.len(),
        rule_set.states.len()
    );
    Ok(rule_set)
}

fn compile_transition(
    index: usize,
    decl: TransitionDecl,
    options: &CompileOptions,
) -> Validation<Compiled, Errors> {
    let site = format!("declaration #{index}");
    let state = state_head(decl.state, &site);
    let event = event_head(decl.event, &site);
    let body = required(decl.body, || DeclarationError::MissingBody { site: site.clone() });

    let (destinations, doc) = (decl.destinations, decl.doc);

    state.and(event).and(body).and_then(|((state, event), body)| {
        let analysis = match destinations {
            Some(annotated) => Validation::success(annotated),
            None => {
                let site = format!("{site} transition ({state}, {event})");
                analyzer::destinations(&body, &state, &site, options)
            }
        };
        analysis.map(|destinations| Compiled::Transition {
            state,
            event,
            body,
            destinations,
            doc,
        })
    })
}

fn compile_bypass(index: usize, decl: BypassDecl) -> Validation<Compiled, Errors> {
    let site = format!("declaration #{index}");
    let event = match decl.event {
        None => Validation::fail(DeclarationError::MissingEvent { site: site.clone() }),
        Some(event) if event.as_str().is_empty() => {
            Validation::fail(DeclarationError::EmptyName { site: site.clone() })
        }
        Some(event) => Validation::success(event),
    };
    let body = required(decl.body, || DeclarationError::MissingBody { site: site.clone() });

    let doc = decl.doc;

    event.and(body).map(|(event, body)| Compiled::Bypass { event, body, doc })
}

fn state_head(state: Option<StateName>, site: &str) -> Validation<StateName, Errors> {
    match state {
        None => Validation::fail(DeclarationError::MissingState {
            site: site.to_string(),
        }),
        Some(state) if state.as_str().is_empty() => Validation::fail(DeclarationError::EmptyName {
            site: site.to_string(),
        }),
        Some(state) => Validation::success(state),
    }
}

fn event_head(event: Option<Event>, site: &str) -> Validation<Event, Errors> {
    match event {
        None => Validation::fail(DeclarationError::MissingEvent {
            site: site.to_string(),
        }),
        Some(Event::Named(name)) if name.as_str().is_empty() => {
            Validation::fail(DeclarationError::EmptyName {
                site: site.to_string(),
            })
        }
        Some(event) => Validation::success(event),
    }
}

fn required<T>(value: Option<T>, missing: impl FnOnce() -> DeclarationError) -> Validation<T, Errors> {
    match value {
        Some(value) => Validation::success(value),
        None => Validation::fail(missing()),
    }
}

fn assemble(id: RuleSetId, compiled: Vec<Compiled>) -> RuleSet {
    let mut rule_set = RuleSet {
        id,
        table: Table::new(),
        bypasses: BTreeMap::new(),
        docs: BTreeMap::new(),
        states: BTreeSet::new(),
        transition_bodies: BTreeMap::new(),
        bypass_bodies: BTreeMap::new(),
    };

    for item in compiled {
        match item {
            Compiled::Transition {
                state,
                event,
                body,
                destinations,
                doc,
            } => {
                rule_set.states.insert(state.clone());
                rule_set.states.extend(destinations.iter().cloned());
                rule_set
                    .docs
                    .insert(DocKey::Transition(state.clone(), event.clone()), doc);
                rule_set.table.insert(
                    (state.clone(), event.clone()),
                    TransitionInfo {
                        owner: rule_set.id.clone(),
                        destinations,
                    },
                );
                rule_set.transition_bodies.insert((state, event), body);
            }
            Compiled::Bypass { event, body, doc } => {
                rule_set.docs.insert(DocKey::Event(event.clone()), doc);
                rule_set.bypasses.insert(event.clone(), rule_set.id.clone());
                rule_set.bypass_bodies.insert(event, body);
            }
        }
    }

    rule_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{arm, case, otherwise, BypassBuilder, TransitionBuilder};
    use crate::dispatch::Reply;

    fn names(states: &[&str]) -> BTreeSet<StateName> {
        states.iter().map(|s| StateName::from(*s)).collect()
    }

    fn key(state: &str, event: &str) -> (StateName, Event) {
        (StateName::from(state), Event::named(event))
    }

    #[test]
    fn table_records_owner_and_destinations() {
        let rule_set = compile(
            "lock",
            vec![TransitionBuilder::new()
                .from("locked")
                .on("one")
                .body(Body::next_state("one"))
                .build()],
            &CompileOptions::default(),
        )
        .unwrap();

        let info = &rule_set.table()[&key("locked", "one")];
        assert_eq!(info.owner, RuleSetId::from("lock"));
        assert_eq!(info.destinations, names(&["one"]));
        assert_eq!(rule_set.states(), &names(&["locked", "one"]));
    }

    #[test]
    fn annotation_wins_over_analysis() {
        let rule_set = compile(
            "orders",
            vec![TransitionBuilder::new()
                .from("pending")
                .on("settle")
                .to_states(["paid", "refused"])
                .body(Body::native(|c| Some(Reply::KeepState(c.state.clone()))))
                .build()],
            &CompileOptions::default(),
        )
        .unwrap();

        assert_eq!(
            rule_set.table()[&key("pending", "settle")].destinations,
            names(&["paid", "refused"])
        );
    }

    #[test]
    fn branch_destinations_are_unioned_and_deduplicated() {
        let body = Body::cond([
            arm(|_| true, Body::next_state("a")),
            arm(|_| true, Body::matching(|_| None, [
                case("x", Body::next_state("a")),
                otherwise(Body::keep_state()),
            ])),
        ]);
        let rule_set = compile(
            "branches",
            vec![TransitionBuilder::new().from("s").on("go").body(body).build()],
            &CompileOptions::default(),
        )
        .unwrap();

        assert_eq!(
            rule_set.table()[&key("s", "go")].destinations,
            names(&["a", "s"])
        );
    }

    #[test]
    fn later_declaration_wins_within_rule_set() {
        let rule_set = compile(
            "dupes",
            vec![
                TransitionBuilder::new()
                    .from("s")
                    .on("go")
                    .body(Body::next_state("first"))
                    .build(),
                TransitionBuilder::new()
                    .from("s")
                    .on("go")
                    .body(Body::next_state("second"))
                    .build(),
            ],
            &CompileOptions::default(),
        )
        .unwrap();

        assert_eq!(rule_set.table().len(), 1);
        assert_eq!(
            rule_set.table()[&key("s", "go")].destinations,
            names(&["second"])
        );
        assert!(rule_set.states().contains(&StateName::from("first")));
    }

    #[test]
    fn bypasses_are_keyed_by_event() {
        let rule_set = compile(
            "reset",
            vec![BypassBuilder::new()
                .on("c")
                .doc("clear")
                .body(Body::next_state("locked"))
                .build()],
            &CompileOptions::default(),
        )
        .unwrap();

        assert!(rule_set.table().is_empty());
        assert_eq!(
            rule_set.bypasses().get(&EventName::from("c")),
            Some(&RuleSetId::from("reset"))
        );
        assert_eq!(rule_set.doc(&DocKey::Event(EventName::from("c"))), Some("clear"));
        assert!(rule_set.bypass_body(&EventName::from("c")).is_some());
        assert!(rule_set.states().is_empty());
    }

    #[test]
    fn unanalyzable_body_fails_whole_rule_set() {
        let result = compile(
            "opaque",
            vec![
                TransitionBuilder::new()
                    .from("a")
                    .on("fine")
                    .body(Body::next_state("b"))
                    .build(),
                TransitionBuilder::new()
                    .from("a")
                    .on("opaque")
                    .body(Body::native(|_| None))
                    .build(),
            ],
            &CompileOptions::default(),
        );

        let error = result.unwrap_err();
        assert_eq!(error.errors.len(), 1);
        assert!(matches!(
            &error.errors[0],
            DeclarationError::UnrecognizedBody { site } if site.contains("(a, opaque)")
        ));
    }

    #[test]
    fn empty_names_are_rejected() {
        let result = compile(
            "empty",
            vec![
                TransitionBuilder::new().from("").on("go").body(Body::keep_state()).build(),
                BypassBuilder::new().on("").body(Body::keep_state()).build(),
            ],
            &CompileOptions::default(),
        );

        let error = result.unwrap_err();
        assert_eq!(error.errors.len(), 2);
        assert!(error
            .errors
            .iter()
            .all(|e| matches!(e, DeclarationError::EmptyName { .. })));
    }

    #[test]
    fn incomplete_declarations_report_every_missing_part() {
        let result = compile(
            "bare",
            vec![TransitionBuilder::new().build(), BypassBuilder::new().build()],
            &CompileOptions::default(),
        );

        let error = result.unwrap_err();
        assert_eq!(
            error.errors,
            vec![
                DeclarationError::MissingState { site: "declaration #0".into() },
                DeclarationError::MissingEvent { site: "declaration #0".into() },
                DeclarationError::MissingBody { site: "declaration #0".into() },
                DeclarationError::MissingEvent { site: "declaration #1".into() },
                DeclarationError::MissingBody { site: "declaration #1".into() },
            ]
        );
    }

    #[test]
    fn graph_and_reachability_follow_destinations() {
        let rule_set = compile(
            "chain",
            vec![
                TransitionBuilder::new().from("a").on("next").body(Body::next_state("b")).build(),
                TransitionBuilder::new().from("b").on("next").body(Body::next_state("c")).build(),
                TransitionBuilder::new().from("x").on_any().body(Body::next_state("a")).build(),
            ],
            &CompileOptions::default(),
        )
        .unwrap();

        assert_eq!(rule_set.graph()[&StateName::from("x")], names(&["a"]));
        assert_eq!(
            rule_set.reachable_from(&StateName::from("a")),
            names(&["a", "b", "c"])
        );
        assert_eq!(
            rule_set.reachable_from(&StateName::from("x")),
            names(&["a", "b", "c", "x"])
        );
    }
}
