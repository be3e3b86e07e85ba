//! Resolution, invocation and reply classification.
//!
//! Every function here is pure over its inputs: the merged table is rebuilt
//! from the value's rule-sets on each call and the input value is never
//! modified.

use crate::builder::Body;
use crate::compiler::{DocKey, RuleSet};
use crate::core::{Changeset, Event, EventName, StateAccessor, StateName, StateValue};
use crate::dispatch::error::{ConsistencyViolation, DispatchError};
use crate::dispatch::reply::{Call, Reply};
use crate::dispatch::table::MergedTable;
use crate::plan;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// The rule that answers a `(state, event)` pair.
#[derive(Clone, Debug)]
pub enum Handler {
    Transition {
        owner: Arc<RuleSet>,
        state: StateName,
        event: Event,
        destinations: BTreeSet<StateName>,
    },
    Bypass {
        owner: Arc<RuleSet>,
        event: EventName,
    },
}

impl Handler {
    pub fn owner(&self) -> &Arc<RuleSet> {
        match self {
            Self::Transition { owner, .. } | Self::Bypass { owner, .. } => owner,
        }
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            Self::Transition {
                owner,
                state,
                event,
                ..
            } => owner.transition_body(state, event),
            Self::Bypass { owner, event } => owner.bypass_body(event),
        }
    }

    pub fn doc_key(&self) -> DocKey {
        match self {
            Self::Transition { state, event, .. } => DocKey::Transition(state.clone(), event.clone()),
            Self::Bypass { event, .. } => DocKey::Event(event.clone()),
        }
    }

    pub fn doc(&self) -> Option<&str> {
        self.owner().doc(&self.doc_key())
    }

    /// Destinations compiled for the transition; `None` for bypasses.
    pub fn destinations(&self) -> Option<&BTreeSet<StateName>> {
        match self {
            Self::Transition { destinations, .. } => Some(destinations),
            Self::Bypass { .. } => None,
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition {
                owner,
                state,
                event,
                ..
            } => write!(f, "{}::transition({}, {})", owner.id(), state, event),
            Self::Bypass { owner, event } => write!(f, "{}::bypass({})", owner.id(), event),
        }
    }
}

/// Merged transition table of every rule-set contributing to `value`.
pub fn merged<S: StateAccessor>(value: &S) -> MergedTable {
    MergedTable::merge(value.rule_sets())
}

/// Find the handler for `event` in the current state of `value`.
///
/// Exact `(state, event)` first, then `(state, Any)`, then a bypass for
/// `event`.
pub fn resolve<S: StateAccessor>(
    value: &S,
    event: &EventName,
) -> Result<Option<Handler>, DispatchError> {
    let state = value.state_name()?;
    Ok(resolve_in(&merged(value), &state, event))
}

fn resolve_in(table: &MergedTable, state: &StateName, event: &EventName) -> Option<Handler> {
    let named = Event::Named(event.clone());
    let transition = table
        .transition(state, &named)
        .map(|hit| (hit, named))
        .or_else(|| table.transition(state, &Event::Any).map(|hit| (hit, Event::Any)));

    if let Some(((owner, info), key_event)) = transition {
        return Some(Handler::Transition {
            owner: Arc::clone(owner),
            state: state.clone(),
            event: key_event,
            destinations: info.destinations.clone(),
        });
    }

    table.bypass(event).map(|owner| Handler::Bypass {
        owner: Arc::clone(owner),
        event: event.clone(),
    })
}

/// Dispatch `event` with `params` against `value`.
///
/// Returns the new state-bearing value, or the reason the action was
/// refused. An invalid changeset comes back unchanged without any handler
/// running.
///
/// # Panics
///
/// Panics with a [`ConsistencyViolation`] when the handler produces no reply
/// or answers `keep_state` with a value in a different state.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::{simple_transition, RuleSetBuilder};
/// use rulebook::core::{EventName, Record, RecordKind, StateAccessor, StateValue};
/// use rulebook::dispatch::dispatch;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let rules = RuleSetBuilder::new("switch")
///     .transition(simple_transition("off", "flip", "on"))
///     .build()
///     .unwrap();
/// let kind = Arc::new(RecordKind::new("lamp", "state").with_rule_set(Arc::new(rules)));
/// let lamp = StateValue::from(Record::new(kind).with_field("state", "off"));
///
/// let lit = dispatch(&lamp, &EventName::from("flip"), &json!({})).unwrap();
/// assert_eq!(lit.state_name().unwrap(), "on");
/// assert!(dispatch(&lit, &EventName::from("flip"), &json!({})).is_err());
/// ```
pub fn dispatch(
    value: &StateValue,
    event: &EventName,
    params: &Value,
) -> Result<StateValue, DispatchError> {
    if let StateValue::Changeset(changeset) = value {
        if !changeset.is_valid() {
            tracing::debug!("skipping '{}' on invalid changeset", event);
            return Ok(value.clone());
        }
    }

    let state = value.state_name()?;
    let Some(handler) = resolve_in(&merged(value), &state, event) else {
        tracing::warn!("illegal action '{}' in state '{}'", event, state);
        return Err(DispatchError::IllegalAction {
            state,
            event: event.clone(),
        });
    };
    tracing::debug!("'{}' in state '{}' handled by {}", event, state, handler);

    let call = Call {
        event: match handler {
            Handler::Transition { .. } => Some(event),
            Handler::Bypass { .. } => None,
        },
        params,
        state: value,
    };
    let reply = handler.body().and_then(|body| body.eval(&call));

    match reply {
        Some(Reply::KeepState(next)) => {
            if let Ok(kept) = next.state_name() {
                if kept != state {
                    violation(
                        &handler,
                        &state,
                        event,
                        format!("keep_state moved the value to '{kept}'"),
                    );
                }
            }
            Ok(next)
        }
        Some(Reply::NextState(name, StateValue::Plan(returned))) => {
            Ok(StateValue::Plan(plan::adapt(value, returned, &name)?))
        }
        Some(Reply::NextState(name, next)) => Ok(next.with_state_name(&name)),
        Some(Reply::Error(reason)) => {
            tracing::debug!("{} refused '{}': {}", handler, event, reason);
            Err(DispatchError::Handler(reason))
        }
        None => violation(&handler, &state, event, "no reply produced".to_string()),
    }
}

fn violation(handler: &Handler, state: &StateName, event: &EventName, detail: String) -> ! {
    let violation = ConsistencyViolation {
        handler: handler.to_string(),
        state: state.clone(),
        action: event.clone(),
        detail,
    };
    tracing::error!("{}", violation);
    panic!("{violation}")
}

/// Dispatch against a changeset, folding a refusal into a validation error on
/// the state field instead of returning it.
pub fn dispatch_staged(changeset: &Changeset, event: &EventName, params: &Value) -> StateValue {
    let value = StateValue::Changeset(changeset.clone());
    match dispatch(&value, event, params) {
        Ok(next) => next,
        Err(error) => {
            let field = changeset.data().kind().state_field();
            StateValue::Changeset(changeset.add_error(field, error.to_string()))
        }
    }
}

/// Events that can be dispatched in the current state.
///
/// Exact-match events first, then [`Event::Any`] if the state has a wildcard
/// transition, then every bypass event; duplicates keep their first position.
pub fn available_actions<S: StateAccessor>(value: &S) -> Result<Vec<Event>, DispatchError> {
    let state = value.state_name()?;
    let table = merged(value);

    let mut actions: Vec<Event> = Vec::new();
    let candidates = table
        .events_at(&state)
        .into_iter()
        .cloned()
        .chain(table.bypass_events().cloned().map(Event::Named));
    for event in candidates {
        if !actions.contains(&event) {
            actions.push(event);
        }
    }
    Ok(actions)
}

/// Whether `event` can be dispatched in the current state. Always true when
/// the state has a wildcard transition.
pub fn action_available<S: StateAccessor>(value: &S, event: &EventName) -> Result<bool, DispatchError> {
    let actions = available_actions(value)?;
    Ok(actions.contains(&Event::Any) || actions.contains(&Event::Named(event.clone())))
}

/// Documentation of the handler that `event` would run, if any.
pub fn describe<S: StateAccessor>(value: &S, event: &EventName) -> Result<Option<String>, DispatchError> {
    Ok(resolve(value, event)?.and_then(|handler| handler.doc().map(str::to_string)))
}
