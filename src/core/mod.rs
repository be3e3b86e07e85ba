//! State-bearing values and the vocabulary shared by the compiler and the
//! dispatcher.
//!
//! - Names of states, events and rule-sets
//! - The [`StateAccessor`] capability and its variants
//! - A caller-owned transition log
//!
//! Nothing in this module owns mutable state; every update returns a new value.

mod changeset;
mod history;
mod names;
mod record;
mod state;

pub use changeset::{Changeset, FieldError};
pub use history::{TransitionLog, TransitionRecord};
pub use names::{Event, EventName, RuleSetId, StateName};
pub use record::{Record, RecordKind};
pub use state::{AccessError, StateAccessor, StateValue};
