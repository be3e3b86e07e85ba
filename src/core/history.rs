//! Caller-owned log of dispatched transitions.
//!
//! The dispatcher keeps nothing between calls. Callers that want an audit
//! trail thread a [`TransitionLog`] through their own code and record each
//! successful dispatch.

use super::names::{EventName, StateName};
use super::state::{AccessError, StateAccessor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single dispatched transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the dispatch
    pub from: StateName,
    /// State after the dispatch
    pub to: StateName,
    /// The dispatched action
    pub event: EventName,
    /// When the transition was recorded
    pub timestamp: DateTime<Utc>,
}

/// Ordered, immutable history of transitions.
///
/// `record` returns a new log with the transition appended.
///
/// # Example
///
/// ```rust
/// use rulebook::core::{EventName, StateName, TransitionLog, TransitionRecord};
/// use chrono::Utc;
///
/// let log = TransitionLog::new().record(TransitionRecord {
///     from: StateName::from("locked"),
///     to: StateName::from("one"),
///     event: EventName::from("one"),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.path(), vec![&StateName::from("locked"), &StateName::from("one")]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new log.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Record a dispatch by reading the state names of its input and output.
    ///
    /// For a plan output the recorded state is the plan's input state, since
    /// the target is only known once the plan has run.
    pub fn record_dispatch<S: StateAccessor>(
        &self,
        event: &EventName,
        before: &S,
        after: &S,
    ) -> Result<Self, AccessError> {
        Ok(self.record(TransitionRecord {
            from: before.state_name()?,
            to: after.state_name()?,
            event: event.clone(),
            timestamp: Utc::now(),
        }))
    }

    /// States traversed: the first `from`, then each `to`.
    pub fn path(&self) -> Vec<&StateName> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Time between the first and last record, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Record, RecordKind};
    use std::sync::Arc;

    fn step(from: &str, to: &str, event: &str) -> TransitionRecord {
        TransitionRecord {
            from: StateName::from(from),
            to: StateName::from(to),
            event: EventName::from(event),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_log_is_empty() {
        let log = TransitionLog::new();
        assert!(log.records().is_empty());
        assert!(log.path().is_empty());
        assert!(log.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let log = TransitionLog::new();
        let next = log.record(step("locked", "one", "one"));

        assert_eq!(log.records().len(), 0);
        assert_eq!(next.records().len(), 1);
    }

    #[test]
    fn path_follows_records() {
        let log = TransitionLog::new()
            .record(step("locked", "one", "one"))
            .record(step("one", "two", "two"));

        let path: Vec<&str> = log.path().iter().map(|s| s.as_str()).collect();
        assert_eq!(path, vec!["locked", "one", "two"]);
    }

    #[test]
    fn record_dispatch_reads_state_names() {
        let kind = Arc::new(RecordKind::new("door", "state"));
        let before = Record::new(kind).with_field("state", "locked");
        let after = before.with_state_name(&StateName::from("one"));

        let log = TransitionLog::new()
            .record_dispatch(&EventName::from("one"), &before, &after)
            .unwrap();

        assert_eq!(log.records()[0].from, "locked");
        assert_eq!(log.records()[0].to, "one");
    }

    #[test]
    fn log_serializes() {
        let log = TransitionLog::new().record(step("locked", "one", "one"));
        let json = serde_json::to_string(&log).unwrap();
        let back: TransitionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, back);
    }
}
