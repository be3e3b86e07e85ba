//! Compile options.

use serde::{Deserialize, Serialize};

/// What to do with an arm the analyzer cannot see into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmPolicy {
    /// Fail compilation unless the declaration carries explicit destinations.
    #[default]
    Reject,
    /// Contribute no destination for the arm and log a warning.
    Ignore,
}

/// Options for compiling a rule-set.
///
/// Deserializable with every field optional, so hosts can keep it in their
/// own configuration files:
///
/// ```rust
/// use rulebook::compiler::{ArmPolicy, CompileOptions};
///
/// let options: CompileOptions = serde_json::from_str(r#"{"unrecognized_arms": "ignore"}"#).unwrap();
/// assert_eq!(options.unrecognized_arms, ArmPolicy::Ignore);
///
/// let defaults: CompileOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(defaults, CompileOptions::default());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub unrecognized_arms: ArmPolicy,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unrecognized_arms(mut self, policy: ArmPolicy) -> Self {
        self.unrecognized_arms = policy;
        self
    }
}
