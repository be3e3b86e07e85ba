//! Transactional plans: ordered, named, deferred steps.
//!
//! A [`Plan`] is an inert description of work. Each step is either a constant,
//! a closure over the outputs of earlier steps, or a state rename of an
//! earlier step's output. Running the steps atomically is the job of whatever
//! transaction runner the host uses; [`Plan::evaluate`] only runs them in
//! order, in memory.

mod adapter;

pub use adapter::adapt;

use crate::compiler::RuleSet;
use crate::core::{AccessError, StateAccessor, StateName, StateValue};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Step holding the value that entered the plan.
pub const INPUT_STEP: &str = "input";

/// Step computing the final state-bearing value.
pub const NEW_STATE_STEP: &str = "newState";

/// Output of a plan step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepValue {
    State(StateValue),
    Data(serde_json::Value),
}

impl StepValue {
    pub fn as_state(&self) -> Option<&StateValue> {
        match self {
            Self::State(value) => Some(value),
            Self::Data(_) => None,
        }
    }
}

/// Outputs of the steps run so far, by step name.
pub type StepOutputs = BTreeMap<String, StepValue>;

/// Deferred step body.
pub type StepFn = Arc<dyn Fn(&StepOutputs) -> Result<StepValue, PlanError> + Send + Sync>;

/// Errors raised while composing or evaluating a plan.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("plan already has a step named '{name}'")]
    DuplicateStep { name: String },

    #[error("step '{step}' depends on '{dependency}', which has no output")]
    MissingOutput { step: String, dependency: String },

    #[error("step '{step}' expected a state-bearing value from '{dependency}'")]
    NotAState { step: String, dependency: String },

    #[error("step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },
}

#[derive(Clone)]
pub enum Step {
    /// A constant output.
    Value(StepValue),
    /// A computation over earlier outputs.
    Run(StepFn),
    /// The state-bearing output of `source`, renamed to state `name`.
    SetStateName { source: String, name: StateName },
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Run(_) => f.write_str("Run(<fn>)"),
            Self::SetStateName { source, name } => f
                .debug_struct("SetStateName")
                .field("source", source)
                .field("name", name)
                .finish(),
        }
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Run(a), Self::Run(b)) => Arc::ptr_eq(a, b),
            (
                Self::SetStateName { source, name },
                Self::SetStateName {
                    source: other_source,
                    name: other_name,
                },
            ) => source == other_source && name == other_name,
            _ => false,
        }
    }
}

/// An ordered list of named steps.
///
/// # Example
///
/// ```rust
/// use rulebook::plan::{Plan, StepValue};
/// use serde_json::json;
///
/// let plan = Plan::new()
///     .put("amount", StepValue::Data(json!(10)))
///     .run("doubled", |outputs| {
///         let amount = outputs["amount"].clone();
///         match amount {
///             StepValue::Data(n) => Ok(StepValue::Data(json!(n.as_i64().unwrap_or(0) * 2))),
///             other => Ok(other),
///         }
///     });
///
/// let outputs = plan.evaluate().unwrap();
/// assert_eq!(outputs["doubled"], StepValue::Data(json!(20)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    steps: Vec<(String, Step)>,
}

impl Plan {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a constant step.
    pub fn put(self, name: impl Into<String>, value: StepValue) -> Self {
        self.push(name, Step::Value(value))
    }

    /// Append a step computed from earlier outputs.
    pub fn run<F>(self, name: impl Into<String>, step: F) -> Self
    where
        F: Fn(&StepOutputs) -> Result<StepValue, PlanError> + Send + Sync + 'static,
    {
        self.push(name, Step::Run(Arc::new(step)))
    }

    /// Append a step renaming the state of `source`'s output.
    pub fn set_state_name(
        self,
        name: impl Into<String>,
        source: impl Into<String>,
        state: StateName,
    ) -> Self {
        self.push(
            name,
            Step::SetStateName {
                source: source.into(),
                name: state,
            },
        )
    }

    fn push(mut self, name: impl Into<String>, step: Step) -> Self {
        self.steps.push((name.into(), step));
        self
    }

    /// Append every step of `other`, rejecting name clashes.
    pub fn append(mut self, other: Plan) -> Result<Self, PlanError> {
        for (name, step) in other.steps {
            if self.contains(&name) {
                return Err(PlanError::DuplicateStep { name });
            }
            self.steps.push((name, step));
        }
        Ok(self)
    }

    /// Drop the step named `name`, if any.
    pub fn without(mut self, name: &str) -> Self {
        self.steps.retain(|(existing, _)| existing != name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|(existing, _)| existing == name)
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, step)| step)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The value that entered the plan, if an input step holds one.
    pub fn input(&self) -> Option<&StateValue> {
        match self.step(INPUT_STEP) {
            Some(Step::Value(StepValue::State(value))) => Some(value),
            _ => None,
        }
    }

    /// Run every step in order and collect the outputs.
    ///
    /// This gives no atomicity: a failing step leaves earlier outputs
    /// discarded but any side effects of earlier closures already happened.
    pub fn evaluate(&self) -> Result<StepOutputs, PlanError> {
        let mut outputs = StepOutputs::new();
        for (name, step) in &self.steps {
            if outputs.contains_key(name) {
                return Err(PlanError::DuplicateStep { name: name.clone() });
            }
            let output = match step {
                Step::Value(value) => value.clone(),
                Step::Run(run) => run(&outputs)?,
                Step::SetStateName { source, name: state } => {
                    let input = outputs.get(source).ok_or_else(|| PlanError::MissingOutput {
                        step: name.clone(),
                        dependency: source.clone(),
                    })?;
                    let value = input.as_state().ok_or_else(|| PlanError::NotAState {
                        step: name.clone(),
                        dependency: source.clone(),
                    })?;
                    StepValue::State(value.with_state_name(state))
                }
            };
            outputs.insert(name.clone(), output);
        }
        Ok(outputs)
    }

    /// Final state-bearing value from a finished run's outputs.
    pub fn final_state(outputs: &StepOutputs) -> Option<&StateValue> {
        outputs.get(NEW_STATE_STEP).and_then(StepValue::as_state)
    }
}

impl StateAccessor for Plan {
    fn rule_sets(&self) -> &[Arc<RuleSet>] {
        self.input().map(|input| input.rule_sets()).unwrap_or(&[])
    }

    fn state_name(&self) -> Result<StateName, AccessError> {
        self.input()
            .ok_or_else(|| AccessError::NoInputStep {
                step: INPUT_STEP.to_string(),
            })?
            .state_name()
    }

    /// Replace (or append) the `newState` step so it renames the input.
    fn with_state_name(&self, name: &StateName) -> Self {
        self.clone()
            .without(NEW_STATE_STEP)
            .set_state_name(NEW_STATE_STEP, INPUT_STEP, name.clone())
    }
}
