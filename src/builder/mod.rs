//! Builder API for declaring rule-sets.
//!
//! Rule bodies are written as [`Body`] trees, wrapped in transition or bypass
//! declarations, and collected by a [`RuleSetBuilder`] that compiles them.

pub mod body;
pub mod error;
pub mod rule_set;
pub mod transition;

pub use body::{arm, case, otherwise, Body, Pattern};
pub use error::{CompileError, DeclarationError};
pub use rule_set::RuleSetBuilder;
pub use transition::{BypassBuilder, BypassDecl, Declaration, TransitionBuilder, TransitionDecl};

use crate::core::{EventName, StateName};
use crate::dispatch::Call;

/// Transition that always moves to `to`.
///
/// # Example
///
/// ```
/// use rulebook::builder::{simple_transition, RuleSetBuilder};
///
/// let rule_set = RuleSetBuilder::new("traffic")
///     .transition(simple_transition("red", "go", "green"))
///     .build()
///     .unwrap();
///
/// assert_eq!(rule_set.table().len(), 1);
/// ```
pub fn simple_transition(
    from: impl Into<StateName>,
    event: impl Into<EventName>,
    to: impl Into<StateName>,
) -> TransitionBuilder {
    TransitionBuilder::new()
        .from(from)
        .on(event)
        .body(Body::next_state(to))
}

/// Transition that moves to `to` when `guard` holds and refuses otherwise.
///
/// # Example
///
/// ```
/// use rulebook::builder::{guarded_transition, RuleSetBuilder};
///
/// let rule_set = RuleSetBuilder::new("doors")
///     .transition(guarded_transition("closed", "open", "opened", |call| {
///         call.param("key").is_some()
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(rule_set.states().len(), 2);
/// ```
pub fn guarded_transition<F>(
    from: impl Into<StateName>,
    event: impl Into<EventName>,
    to: impl Into<StateName>,
    guard: F,
) -> TransitionBuilder
where
    F: Fn(&Call<'_>) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new().from(from).on(event).body(Body::if_else(
        guard,
        Body::next_state(to),
        Body::error("guard rejected transition"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use std::collections::BTreeSet;

    #[test]
    fn simple_transition_builds() {
        let rule_set = RuleSetBuilder::new("traffic")
            .transition(simple_transition("red", "go", "green"))
            .build()
            .unwrap();

        let info = &rule_set.table()[&(StateName::from("red"), Event::named("go"))];
        assert_eq!(info.destinations, BTreeSet::from([StateName::from("green")]));
    }

    #[test]
    fn guarded_transition_only_reaches_target() {
        let rule_set = RuleSetBuilder::new("doors")
            .transition(guarded_transition("closed", "open", "opened", |_| true))
            .build()
            .unwrap();

        let info = &rule_set.table()[&(StateName::from("closed"), Event::named("open"))];
        assert_eq!(info.destinations, BTreeSet::from([StateName::from("opened")]));
    }
}
