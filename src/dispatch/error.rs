//! Dispatch errors.

use crate::core::{AccessError, EventName, StateName};
use crate::plan::PlanError;
use serde_json::Value;
use thiserror::Error;

/// Recoverable dispatch failures, returned to the caller as values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error("illegal action '{event}' in state '{state}'")]
    IllegalAction { state: StateName, event: EventName },

    #[error("handler refused: {0}")]
    Handler(Value),

    #[error("cannot read state: {0}")]
    Access(#[from] AccessError),

    #[error("cannot compose plan: {0}")]
    Plan(#[from] PlanError),
}

impl DispatchError {
    /// Stable code for rendering the error, e.g. as a validation message.
    pub fn error_code(&self) -> &'static str {
        match self {
            DispatchError::IllegalAction { .. } => "illegal_action",
            DispatchError::Handler(_) => "handler_error",
            DispatchError::Access(_) => "state_unreadable",
            DispatchError::Plan(_) => "plan_conflict",
        }
    }
}

/// A handler answered outside the reply contract.
///
/// This is a defect in the rule-set, not a runtime condition: dispatch logs
/// it and panics with it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("handler {handler} broke the reply contract in state '{state}' on action '{action}': {detail}")]
pub struct ConsistencyViolation {
    pub handler: String,
    pub state: StateName,
    pub action: EventName,
    pub detail: String,
}
