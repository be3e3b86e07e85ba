//! Folds a handler's plan into a plan that ends in the requested state.

use super::{Plan, PlanError, StepValue, INPUT_STEP, NEW_STATE_STEP};
use crate::core::{StateAccessor, StateName, StateValue};

/// Build the plan returned for `next_state(target, plan)`.
///
/// The result starts with an `input` step holding `original`, continues with
/// every step of `returned`, and ends with a `newState` step that renames the
/// input's state to `target`. Nothing is executed here.
///
/// When `original` is itself a plan, its steps (other than `newState`) stand
/// in for the `input` step. A returned plan that already carries a
/// state-bearing `input` step was built on a plan value, so only its
/// `newState` step is retargeted.
pub fn adapt(original: &StateValue, returned: Plan, target: &StateName) -> Result<Plan, PlanError> {
    if returned.input().is_some() {
        return Ok(returned.with_state_name(target));
    }

    let head = match original {
        StateValue::Plan(plan) => plan.clone().without(NEW_STATE_STEP),
        other => Plan::new().put(INPUT_STEP, StepValue::State(other.clone())),
    };
    let tail = Plan::new().set_state_name(NEW_STATE_STEP, INPUT_STEP, target.clone());

    head.append(returned)?.append(tail)
}
