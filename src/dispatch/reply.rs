//! What a handler sees and what it may answer.

use crate::core::{EventName, StateName, StateValue};
use serde_json::Value;

/// Arguments of one handler invocation.
///
/// `event` is `None` for bypass handlers, which are keyed on the event and
/// only receive the parameters and the state-bearing value.
#[derive(Clone, Copy, Debug)]
pub struct Call<'a> {
    pub event: Option<&'a EventName>,
    pub params: &'a Value,
    pub state: &'a StateValue,
}

impl<'a> Call<'a> {
    /// Parameter lookup by key, for object-shaped params.
    pub fn param(&self, key: &str) -> Option<&'a Value> {
        self.params.get(key)
    }
}

/// The canonical replies a handler may produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Stay in the current state with an updated value.
    KeepState(StateValue),
    /// Move to the named state. A plan value is wrapped by the plan adapter.
    NextState(StateName, StateValue),
    /// Refuse the action; the reason reaches the caller verbatim.
    Error(Value),
}

impl Reply {
    pub fn keep_state(value: StateValue) -> Self {
        Self::KeepState(value)
    }

    pub fn next_state(name: impl Into<StateName>, value: StateValue) -> Self {
        Self::NextState(name.into(), value)
    }

    pub fn error(reason: impl Into<Value>) -> Self {
        Self::Error(reason.into())
    }
}
