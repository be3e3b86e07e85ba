//! Builder collecting the declarations of one rule-set.

use crate::builder::error::CompileError;
use crate::builder::transition::{BypassBuilder, Declaration, TransitionBuilder};
use crate::compiler::{compile, CompileOptions, RuleSet};
use crate::core::RuleSetId;

/// Accumulates declarations in order, then compiles them into a [`RuleSet`].
///
/// A `doc` call attaches to the next declaration that has no doc of its own.
///
/// # Example
///
/// ```rust
/// use rulebook::builder::{Body, BypassBuilder, RuleSetBuilder, TransitionBuilder};
///
/// let rule_set = RuleSetBuilder::new("switch")
///     .doc("flip the switch on")
///     .transition(TransitionBuilder::new().from("off").on("flip").body(Body::next_state("on")))
///     .transition(TransitionBuilder::new().from("on").on("flip").body(Body::next_state("off")))
///     .bypass(BypassBuilder::new().on("reset").body(Body::next_state("off")))
///     .build()
///     .unwrap();
///
/// assert_eq!(rule_set.table().len(), 2);
/// assert_eq!(rule_set.states().len(), 2);
/// ```
pub struct RuleSetBuilder {
    id: RuleSetId,
    options: CompileOptions,
    declarations: Vec<Declaration>,
    pending_doc: Option<String>,
}

impl RuleSetBuilder {
    pub fn new(id: impl Into<RuleSetId>) -> Self {
        Self {
            id: id.into(),
            options: CompileOptions::default(),
            declarations: Vec::new(),
            pending_doc: None,
        }
    }

    /// Replace the compile options.
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Document the next declaration.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.pending_doc = Some(doc.into());
        self
    }

    /// Add a transition declaration.
    pub fn transition(self, builder: TransitionBuilder) -> Self {
        self.declare(builder.build())
    }

    /// Add a bypass declaration.
    pub fn bypass(self, builder: BypassBuilder) -> Self {
        self.declare(builder.build())
    }

    /// Add a pre-built declaration.
    pub fn declare(mut self, mut declaration: Declaration) -> Self {
        if let Some(doc) = self.pending_doc.take() {
            if declaration.doc().is_none() {
                declaration.set_doc(doc);
            }
        }
        self.declarations.push(declaration);
        self
    }

    /// Add several declarations at once.
    pub fn declarations(self, declarations: impl IntoIterator<Item = Declaration>) -> Self {
        declarations
            .into_iter()
            .fold(self, |builder, declaration| builder.declare(declaration))
    }

    /// Compile the declarations.
    /// Returns every malformed declaration if any is found.
    pub fn build(self) -> Result<RuleSet, CompileError> {
        compile(self.id, self.declarations, &self.options)
    }
}
