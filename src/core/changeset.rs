//! Staged-mutation records.

use crate::compiler::RuleSet;
use crate::core::names::StateName;
use crate::core::record::Record;
use crate::core::state::{AccessError, StateAccessor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Validation error attached to a field of a changeset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A record plus changes that have not been committed yet.
///
/// Reads honor pending changes. Once an error is added the changeset is
/// invalid, and dispatch hands it back without invoking any handler.
#[derive(Clone, Debug, PartialEq)]
pub struct Changeset {
    data: Record,
    changes: Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Changeset {
    pub fn new(data: Record) -> Self {
        Self {
            data,
            changes: Map::new(),
            errors: Vec::new(),
        }
    }

    /// Stage a change to `field`.
    pub fn change(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.changes.insert(field.into(), value.into());
        next
    }

    /// Attach a validation error, marking the changeset invalid.
    pub fn add_error(&self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
        next
    }

    /// Effective value of `field`: the staged change if any, else the record's.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.changes.get(field).or_else(|| self.data.get(field))
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn changes(&self) -> &Map<String, Value> {
        &self.changes
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold the staged changes into a new record.
    pub fn apply(&self) -> Record {
        self.changes
            .iter()
            .fold(self.data.clone(), |record, (field, value)| {
                record.with_field(field.clone(), value.clone())
            })
    }
}

impl StateAccessor for Changeset {
    fn rule_sets(&self) -> &[Arc<RuleSet>] {
        self.data.rule_sets()
    }

    fn state_name(&self) -> Result<StateName, AccessError> {
        let field = self.data.kind().state_field();
        match self.changes.get(field) {
            Some(staged) => self.data.read_state(Some(staged)),
            None => self.data.state_name(),
        }
    }

    fn with_state_name(&self, name: &StateName) -> Self {
        self.change(self.data.kind().state_field(), name.as_str())
    }
}
