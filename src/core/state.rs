//! The state accessor capability shared by every state-bearing value.
//!
//! The dispatcher never inspects a record directly. It asks the value for the
//! rule-sets that govern it, for its current state name, and for a copy carrying
//! a new state name. Three variants implement the capability: a plain
//! [`Record`], a staged [`Changeset`], and a transactional [`Plan`].

use crate::compiler::RuleSet;
use crate::core::changeset::Changeset;
use crate::core::names::StateName;
use crate::core::record::Record;
use crate::plan::Plan;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading the state of a state-bearing value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    #[error("record '{kind}' has no state field '{field}'")]
    MissingStateField { kind: String, field: String },

    #[error("state field '{field}' of record '{kind}' is not a string")]
    StateFieldNotString { kind: String, field: String },

    #[error("plan has no '{step}' step holding a state-bearing value")]
    NoInputStep { step: String },
}

/// Capability implemented by every state-bearing value.
///
/// All methods are pure. `with_state_name` returns a new value and leaves
/// `self` untouched; what "setting" means is up to the variant (a field
/// update, a staged change, or an appended plan step).
///
/// # Example
///
/// ```rust
/// use rulebook::core::{Record, RecordKind, StateAccessor, StateName};
/// use std::sync::Arc;
///
/// let kind = Arc::new(RecordKind::new("door", "state"));
/// let door = Record::new(kind).with_field("state", "locked");
///
/// let opened = door.with_state_name(&StateName::from("open"));
/// assert_eq!(opened.state_name().unwrap(), "open");
/// assert_eq!(door.state_name().unwrap(), "locked");
/// ```
pub trait StateAccessor: Clone {
    /// Rule-sets contributing transitions, in merge order (later wins).
    fn rule_sets(&self) -> &[Arc<RuleSet>];

    /// Current state name.
    fn state_name(&self) -> Result<StateName, AccessError>;

    /// Copy of this value carrying `name` as its state.
    fn with_state_name(&self, name: &StateName) -> Self;
}

/// The closed set of state-bearing values the dispatcher accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum StateValue {
    Record(Record),
    Changeset(Changeset),
    Plan(Plan),
}

impl StateValue {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_changeset(&self) -> Option<&Changeset> {
        match self {
            Self::Changeset(changeset) => Some(changeset),
            _ => None,
        }
    }

    pub fn as_plan(&self) -> Option<&Plan> {
        match self {
            Self::Plan(plan) => Some(plan),
            _ => None,
        }
    }

    /// Short tag naming the variant, for diagnostics.
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Changeset(_) => "changeset",
            Self::Plan(_) => "plan",
        }
    }
}

impl StateAccessor for StateValue {
    fn rule_sets(&self) -> &[Arc<RuleSet>] {
        match self {
            Self::Record(record) => record.rule_sets(),
            Self::Changeset(changeset) => changeset.rule_sets(),
            Self::Plan(plan) => plan.rule_sets(),
        }
    }

    fn state_name(&self) -> Result<StateName, AccessError> {
        match self {
            Self::Record(record) => record.state_name(),
            Self::Changeset(changeset) => changeset.state_name(),
            Self::Plan(plan) => plan.state_name(),
        }
    }

    fn with_state_name(&self, name: &StateName) -> Self {
        match self {
            Self::Record(record) => Self::Record(record.with_state_name(name)),
            Self::Changeset(changeset) => Self::Changeset(changeset.with_state_name(name)),
            Self::Plan(plan) => Self::Plan(plan.with_state_name(name)),
        }
    }
}

impl From<Record> for StateValue {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Changeset> for StateValue {
    fn from(changeset: Changeset) -> Self {
        Self::Changeset(changeset)
    }
}

impl From<Plan> for StateValue {
    fn from(plan: Plan) -> Self {
        Self::Plan(plan)
    }
}
