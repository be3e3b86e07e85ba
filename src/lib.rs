//! Rulebook: declarative finite state machines over plain data.
//!
//! A rule-set is declared once, compiled into an immutable transition table,
//! and attached to a kind of record. Dispatch is a pure function of a
//! state-bearing value, an event and parameters: it returns a new value or an
//! error and never mutates its input.
//!
//! # Core Concepts
//!
//! - **Declarations**: transitions keyed on `(state, event)` and bypasses keyed
//!   on the event alone, built with [`builder`]
//! - **Compilation**: static analysis of each body into the set of states it
//!   can reach, see [`compiler`]
//! - **State-bearing values**: plain records, changesets and transactional
//!   plans, unified behind [`core::StateAccessor`]
//! - **Dispatch**: merge, resolve, evaluate and classify, see [`dispatch`]
//!
//! # Example
//!
//! ```rust
//! use rulebook::builder::{simple_transition, Body, RuleSetBuilder, TransitionBuilder};
//! use rulebook::core::{EventName, Record, RecordKind, StateAccessor, StateValue};
//! use rulebook::dispatch::{available_actions, dispatch};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let turnstile = RuleSetBuilder::new("turnstile")
//!     .transition(simple_transition("locked", "coin", "open"))
//!     .transition(simple_transition("open", "push", "locked"))
//!     .transition(TransitionBuilder::new().from("open").on("coin").body(Body::keep_state()))
//!     .build()
//!     .unwrap();
//!
//! let kind = Arc::new(RecordKind::new("gate", "state").with_rule_set(Arc::new(turnstile)));
//! let gate = StateValue::from(Record::new(kind).with_field("state", "locked"));
//!
//! let gate = dispatch(&gate, &EventName::from("coin"), &json!({})).unwrap();
//! assert_eq!(gate.state_name().unwrap(), "open");
//! assert_eq!(available_actions(&gate).unwrap().len(), 2);
//! ```

pub mod builder;
pub mod compiler;
pub mod core;
pub mod dispatch;
pub mod plan;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{Body, RuleSetBuilder};
pub use compiler::{compile, CompileOptions, RuleSet};
pub use core::{Event, EventName, StateAccessor, StateName, StateValue};
pub use dispatch::{dispatch, DispatchError};
