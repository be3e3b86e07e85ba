//! Plain records: the state name lives in an ordinary field.

use crate::compiler::RuleSet;
use crate::core::names::StateName;
use crate::core::state::{AccessError, StateAccessor};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Shape shared by every record of one kind: which field holds the state and
/// which rule-sets govern it.
pub struct RecordKind {
    name: String,
    state_field: String,
    rule_sets: Vec<Arc<RuleSet>>,
}

impl RecordKind {
    pub fn new(name: impl Into<String>, state_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_field: state_field.into(),
            rule_sets: Vec::new(),
        }
    }

    /// Append a contributing rule-set. Later rule-sets win key collisions.
    pub fn with_rule_set(mut self, rule_set: Arc<RuleSet>) -> Self {
        self.rule_sets.push(rule_set);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_field(&self) -> &str {
        &self.state_field
    }

    pub fn rule_sets(&self) -> &[Arc<RuleSet>] {
        &self.rule_sets
    }
}

impl fmt::Debug for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordKind")
            .field("name", &self.name)
            .field("state_field", &self.state_field)
            .field(
                "rule_sets",
                &self.rule_sets.iter().map(|r| r.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A record value with JSON fields.
///
/// Records have value semantics: every update returns a new record.
#[derive(Clone, Debug)]
pub struct Record {
    kind: Arc<RecordKind>,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(kind: Arc<RecordKind>) -> Self {
        Self {
            kind,
            fields: Map::new(),
        }
    }

    /// Return a copy with `field` set to `value`.
    pub fn with_field(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(field.into(), value.into());
        Self {
            kind: Arc::clone(&self.kind),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn kind(&self) -> &Arc<RecordKind> {
        &self.kind
    }

    pub(crate) fn read_state(&self, value: Option<&Value>) -> Result<StateName, AccessError> {
        match value {
            Some(Value::String(name)) => Ok(StateName::new(name.as_str())),
            Some(_) => Err(AccessError::StateFieldNotString {
                kind: self.kind.name.clone(),
                field: self.kind.state_field.clone(),
            }),
            None => Err(AccessError::MissingStateField {
                kind: self.kind.name.clone(),
                field: self.kind.state_field.clone(),
            }),
        }
    }
}

/// Kinds are equal when name and state field match and they share the very
/// same rule-sets, in the same order.
impl PartialEq for RecordKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.state_field == other.state_field
            && self.rule_sets.len() == other.rule_sets.len()
            && self
                .rule_sets
                .iter()
                .zip(&other.rule_sets)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.kind, &other.kind) || self.kind == other.kind) && self.fields == other.fields
    }
}

impl StateAccessor for Record {
    fn rule_sets(&self) -> &[Arc<RuleSet>] {
        self.kind.rule_sets()
    }

    fn state_name(&self) -> Result<StateName, AccessError> {
        self.read_state(self.fields.get(&self.kind.state_field))
    }

    fn with_state_name(&self, name: &StateName) -> Self {
        self.with_field(self.kind.state_field.clone(), name.as_str())
    }
}
