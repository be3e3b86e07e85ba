//! Builders for transition and bypass declarations.

use crate::builder::body::Body;
use crate::core::{Event, EventName, StateName};
use std::collections::BTreeSet;

/// One declaration of a rule-set, as written. Nothing is validated until the
/// rule-set is compiled.
#[derive(Clone, Debug)]
pub enum Declaration {
    Transition(TransitionDecl),
    Bypass(BypassDecl),
}

/// A `(state, event) -> body` declaration.
#[derive(Clone, Debug, Default)]
pub struct TransitionDecl {
    pub state: Option<StateName>,
    pub event: Option<Event>,
    pub body: Option<Body>,
    /// Destination override; when present the body is not analyzed.
    pub destinations: Option<BTreeSet<StateName>>,
    pub doc: Option<String>,
}

/// An `event -> body` declaration matching in every state.
#[derive(Clone, Debug, Default)]
pub struct BypassDecl {
    pub event: Option<EventName>,
    pub body: Option<Body>,
    pub doc: Option<String>,
}

/// Builder for transition declarations with a fluent API.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::{Body, TransitionBuilder};
///
/// let declaration = TransitionBuilder::new()
///     .from("locked")
///     .on("one")
///     .doc("first digit")
///     .body(Body::next_state("one"))
///     .build();
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    decl: TransitionDecl,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<StateName>) -> Self {
        self.decl.state = Some(state.into());
        self
    }

    /// Set the event (required, or use `on_any`).
    pub fn on(mut self, event: impl Into<EventName>) -> Self {
        self.decl.event = Some(Event::Named(event.into()));
        self
    }

    /// Match every event not declared explicitly for the source state.
    pub fn on_any(mut self) -> Self {
        self.decl.event = Some(Event::Any);
        self
    }

    /// Set the rule body (required).
    pub fn body(mut self, body: Body) -> Self {
        self.decl.body = Some(body);
        self
    }

    /// Declare the destination states explicitly instead of analyzing the body.
    pub fn to_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateName>,
    {
        self.decl.destinations = Some(states.into_iter().map(Into::into).collect());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.decl.doc = Some(doc.into());
        self
    }

    pub fn build(self) -> Declaration {
        Declaration::Transition(self.decl)
    }
}

/// Builder for bypass declarations.
#[derive(Default)]
pub struct BypassBuilder {
    decl: BypassDecl,
}

impl BypassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event (required).
    pub fn on(mut self, event: impl Into<EventName>) -> Self {
        self.decl.event = Some(event.into());
        self
    }

    /// Set the handler body (required).
    pub fn body(mut self, body: Body) -> Self {
        self.decl.body = Some(body);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.decl.doc = Some(doc.into());
        self
    }

    pub fn build(self) -> Declaration {
        Declaration::Bypass(self.decl)
    }
}

impl From<TransitionBuilder> for Declaration {
    fn from(builder: TransitionBuilder) -> Self {
        builder.build()
    }
}

impl From<BypassBuilder> for Declaration {
    fn from(builder: BypassBuilder) -> Self {
        builder.build()
    }
}

impl Declaration {
    pub(crate) fn doc(&self) -> Option<&String> {
        match self {
            Self::Transition(decl) => decl.doc.as_ref(),
            Self::Bypass(decl) => decl.doc.as_ref(),
        }
    }

    pub(crate) fn set_doc(&mut self, doc: String) {
        match self {
            Self::Transition(decl) => decl.doc = Some(doc),
            Self::Bypass(decl) => decl.doc = Some(doc),
        }
    }
}
