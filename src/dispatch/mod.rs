//! Stateless dispatch of events against state-bearing values.
//!
//! The engine holds nothing between calls. Each dispatch merges the tables of
//! the value's rule-sets, resolves a handler for the current state, evaluates
//! its body and turns the reply into a new value or an error.

mod error;
mod machine;
mod reply;
mod table;

pub use error::{ConsistencyViolation, DispatchError};
pub use machine::{
    action_available, available_actions, describe, dispatch, dispatch_staged, merged, resolve,
    Handler,
};
pub use reply::{Call, Reply};
pub use table::MergedTable;
