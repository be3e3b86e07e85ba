//! Errors raised while compiling rule-set declarations.

use thiserror::Error;

/// A single malformed declaration.
///
/// `site` locates the declaration: its position in the rule-set and, when
/// known, its `(state, event)` head.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("{site}: transition has no source state. Call .from(state)")]
    MissingState { site: String },

    #[error("{site}: declaration has no event. Call .on(event) or .on_any()")]
    MissingEvent { site: String },

    #[error("{site}: declaration has no body. Call .body(body)")]
    MissingBody { site: String },

    #[error("{site}: state and event names must not be empty")]
    EmptyName { site: String },

    #[error("{site}: body is not analyzable; annotate it with .to_states(...)")]
    UnrecognizedBody { site: String },
}

/// Every error found while compiling one rule-set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rule-set '{rule_set}' is malformed: {}", summarize(.errors))]
pub struct CompileError {
    pub rule_set: String,
    pub errors: Vec<DeclarationError>,
}

fn summarize(errors: &[DeclarationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
