//! Rule bodies as a tagged expression tree.
//!
//! The compiler walks this tree to find every state a rule can reach, and the
//! dispatcher evaluates the same tree to produce a [`Reply`]. Leaves are the
//! canonical replies; branches choose between sub-bodies with closures over the
//! [`Call`]. [`Body::Native`] is an escape hatch the analyzer cannot see into.

use crate::core::{StateName, StateValue};
use crate::dispatch::{Call, Reply};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Branch predicate.
pub type Predicate = Arc<dyn Fn(&Call<'_>) -> bool + Send + Sync>;

/// Computes the key a [`Body::Match`] dispatches on.
pub type Selector = Arc<dyn Fn(&Call<'_>) -> Option<String> + Send + Sync>;

/// Computes the value carried by a keep/next leaf.
pub type Update = Arc<dyn Fn(&Call<'_>) -> StateValue + Send + Sync>;

/// Computes an error reason.
pub type ReasonFn = Arc<dyn Fn(&Call<'_>) -> Value + Send + Sync>;

/// Opaque handler. `None` means it produced no reply.
pub type NativeFn = Arc<dyn Fn(&Call<'_>) -> Option<Reply> + Send + Sync>;

/// Pattern of a match arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Wildcard,
}

impl Pattern {
    fn matches(&self, key: Option<&str>) -> bool {
        match self {
            Self::Exact(expected) => key == Some(expected.as_str()),
            Self::Wildcard => true,
        }
    }
}

#[derive(Clone)]
pub enum Body {
    /// Keep the current state. Without an update the input value is returned.
    KeepState(Option<Update>),
    /// Move to a state.
    NextState(StateName, Option<Update>),
    /// Refuse with a reason.
    Error(ReasonFn),
    /// Two-way conditional; a false condition without `otherwise` yields nothing.
    If {
        condition: Predicate,
        then: Box<Body>,
        otherwise: Option<Box<Body>>,
    },
    /// First arm whose predicate holds.
    Cond(Vec<(Predicate, Body)>),
    /// First arm whose pattern matches the selected key.
    Match {
        selector: Selector,
        arms: Vec<(Pattern, Body)>,
    },
    /// Short-circuit: the body runs only when the predicate holds.
    And(Predicate, Box<Body>),
    Native(NativeFn),
}

impl Body {
    pub fn keep_state() -> Self {
        Self::KeepState(None)
    }

    pub fn keep_state_with<F>(update: F) -> Self
    where
        F: Fn(&Call<'_>) -> StateValue + Send + Sync + 'static,
    {
        Self::KeepState(Some(Arc::new(update)))
    }

    pub fn next_state(name: impl Into<StateName>) -> Self {
        Self::NextState(name.into(), None)
    }

    pub fn next_state_with<F>(name: impl Into<StateName>, update: F) -> Self
    where
        F: Fn(&Call<'_>) -> StateValue + Send + Sync + 'static,
    {
        Self::NextState(name.into(), Some(Arc::new(update)))
    }

    pub fn error(reason: impl Into<Value>) -> Self {
        let reason = reason.into();
        Self::error_with(move |_| reason.clone())
    }

    pub fn error_with<F>(reason: F) -> Self
    where
        F: Fn(&Call<'_>) -> Value + Send + Sync + 'static,
    {
        Self::Error(Arc::new(reason))
    }

    pub fn when<F>(condition: F, then: Body) -> Self
    where
        F: Fn(&Call<'_>) -> bool + Send + Sync + 'static,
    {
        Self::If {
            condition: Arc::new(condition),
            then: Box::new(then),
            otherwise: None,
        }
    }

    pub fn if_else<F>(condition: F, then: Body, otherwise: Body) -> Self
    where
        F: Fn(&Call<'_>) -> bool + Send + Sync + 'static,
    {
        Self::If {
            condition: Arc::new(condition),
            then: Box::new(then),
            otherwise: Some(Box::new(otherwise)),
        }
    }

    pub fn cond(arms: impl IntoIterator<Item = (Predicate, Body)>) -> Self {
        Self::Cond(arms.into_iter().collect())
    }

    pub fn matching<F>(selector: F, arms: impl IntoIterator<Item = (Pattern, Body)>) -> Self
    where
        F: Fn(&Call<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self::Match {
            selector: Arc::new(selector),
            arms: arms.into_iter().collect(),
        }
    }

    pub fn and<F>(predicate: F, body: Body) -> Self
    where
        F: Fn(&Call<'_>) -> bool + Send + Sync + 'static,
    {
        Self::And(Arc::new(predicate), Box::new(body))
    }

    pub fn native<F>(handler: F) -> Self
    where
        F: Fn(&Call<'_>) -> Option<Reply> + Send + Sync + 'static,
    {
        Self::Native(Arc::new(handler))
    }

    /// Evaluate the body. `None` means no branch produced a reply.
    pub fn eval(&self, call: &Call<'_>) -> Option<Reply> {
        match self {
            Self::KeepState(update) => Some(Reply::KeepState(apply(update, call))),
            Self::NextState(name, update) => {
                Some(Reply::NextState(name.clone(), apply(update, call)))
            }
            Self::Error(reason) => Some(Reply::Error(reason(call))),
            Self::If {
                condition,
                then,
                otherwise,
            } => {
                if condition(call) {
                    then.eval(call)
                } else {
                    otherwise.as_ref().and_then(|body| body.eval(call))
                }
            }
            Self::Cond(arms) => arms
                .iter()
                .find(|(predicate, _)| predicate(call))
                .and_then(|(_, body)| body.eval(call)),
            Self::Match { selector, arms } => {
                let key = selector(call);
                arms.iter()
                    .find(|(pattern, _)| pattern.matches(key.as_deref()))
                    .and_then(|(_, body)| body.eval(call))
            }
            Self::And(predicate, body) => {
                if predicate(call) {
                    body.eval(call)
                } else {
                    None
                }
            }
            Self::Native(handler) => handler(call),
        }
    }
}

fn apply(update: &Option<Update>, call: &Call<'_>) -> StateValue {
    match update {
        Some(update) => update(call),
        None => call.state.clone(),
    }
}

/// Arm of a [`Body::cond`].
pub fn arm<F>(predicate: F, body: Body) -> (Predicate, Body)
where
    F: Fn(&Call<'_>) -> bool + Send + Sync + 'static,
{
    (Arc::new(predicate), body)
}

/// Arm of a [`Body::matching`] taken when the key equals `key`.
pub fn case(key: impl Into<String>, body: Body) -> (Pattern, Body) {
    (Pattern::Exact(key.into()), body)
}

/// Catch-all arm of a [`Body::matching`].
pub fn otherwise(body: Body) -> (Pattern, Body) {
    (Pattern::Wildcard, body)
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepState(_) => f.write_str("KeepState"),
            Self::NextState(name, _) => f.debug_tuple("NextState").field(name).finish(),
            Self::Error(_) => f.write_str("Error"),
            Self::If {
                then, otherwise, ..
            } => f
                .debug_struct("If")
                .field("then", then)
                .field("otherwise", otherwise)
                .finish(),
            Self::Cond(arms) => f
                .debug_list()
                .entries(arms.iter().map(|(_, body)| body))
                .finish(),
            Self::Match { arms, .. } => f
                .debug_map()
                .entries(arms.iter().map(|(pattern, body)| (pattern, body)))
                .finish(),
            Self::And(_, body) => f.debug_tuple("And").field(body).finish(),
            Self::Native(_) => f.write_str("Native(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventName, Record, RecordKind, StateAccessor};
    use serde_json::json;

    fn door(state: &str) -> StateValue {
        Record::new(Arc::new(RecordKind::new("door", "state")))
            .with_field("state", state)
            .into()
    }

    fn call<'a>(event: &'a EventName, params: &'a Value, state: &'a StateValue) -> Call<'a> {
        Call {
            event: Some(event),
            params,
            state,
        }
    }

    #[test]
    fn keep_state_returns_input_value() {
        let state = door("locked");
        let event = EventName::from("push");
        let params = json!({});

        let reply = Body::keep_state().eval(&call(&event, &params, &state));
        assert_eq!(reply, Some(Reply::KeepState(state.clone())));
    }

    #[test]
    fn next_state_with_applies_update() {
        let state = door("locked");
        let event = EventName::from("one");
        let params = json!({"by": "alice"});

        let body = Body::next_state_with("one", |c| match c.state {
            StateValue::Record(r) => {
                let by = c.param("by").cloned().unwrap_or(Value::Null);
                r.with_field("by", by).into()
            }
            other => other.clone(),
        });

        match body.eval(&call(&event, &params, &state)) {
            Some(Reply::NextState(name, StateValue::Record(record))) => {
                assert_eq!(name, "one");
                assert_eq!(record.get("by"), Some(&json!("alice")));
                assert_eq!(record.state_name().unwrap(), "locked");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn match_takes_first_matching_arm() {
        let state = door("unlocked");
        let event = EventName::from("lock");
        let params = json!({});

        let body = Body::matching(
            |c| c.event.map(|e| e.as_str().to_string()),
            [case("lock", Body::next_state("locked")), otherwise(Body::keep_state())],
        );

        assert!(matches!(
            body.eval(&call(&event, &params, &state)),
            Some(Reply::NextState(name, _)) if name == "locked"
        ));
    }

    #[test]
    fn uncovered_branches_yield_nothing() {
        let state = door("locked");
        let event = EventName::from("one");
        let params = json!({});
        let c = call(&event, &params, &state);

        assert_eq!(Body::when(|_| false, Body::keep_state()).eval(&c), None);
        assert_eq!(Body::and(|_| false, Body::keep_state()).eval(&c), None);
        assert_eq!(Body::cond([arm(|_| false, Body::keep_state())]).eval(&c), None);
        assert_eq!(
            Body::matching(|_| None, [case("x", Body::keep_state())]).eval(&c),
            None
        );
    }

    #[test]
    fn error_reason_is_verbatim() {
        let state = door("locked");
        let event = EventName::from("one");
        let params = json!({});

        let reply = Body::error(json!({"code": 42})).eval(&call(&event, &params, &state));
        assert_eq!(reply, Some(Reply::Error(json!({"code": 42}))));
    }
}
