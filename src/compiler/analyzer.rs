//! Static destination analysis of rule bodies.
//!
//! Walks a [`Body`] without evaluating it and collects every state a leaf can
//! reach. Each branch of every conditional is visited and the results are
//! unioned. Arms a branch does not have contribute nothing. Errors from all
//! arms are accumulated rather than stopping at the first.

use crate::builder::{Body, DeclarationError};
use crate::compiler::options::{ArmPolicy, CompileOptions};
use crate::core::StateName;
use std::collections::BTreeSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub(crate) type Analysis = Validation<BTreeSet<StateName>, NonEmptyVec<DeclarationError>>;

/// Destinations reachable from `body` when declared at state `current`.
///
/// `Body::Native` at the top level is always rejected; inside a branch it is
/// rejected or ignored according to `options.unrecognized_arms`.
pub(crate) fn destinations(
    body: &Body,
    current: &StateName,
    site: &str,
    options: &CompileOptions,
) -> Analysis {
    walk(body, current, site, options, false)
}

fn walk(
    body: &Body,
    current: &StateName,
    site: &str,
    options: &CompileOptions,
    in_branch: bool,
) -> Analysis {
    match body {
        Body::KeepState(_) => Validation::success(BTreeSet::from([current.clone()])),
        Body::NextState(name, _) => Validation::success(BTreeSet::from([name.clone()])),
        Body::Error(_) => Validation::success(BTreeSet::new()),
        Body::If {
            then, otherwise, ..
        } => {
            let mut arms = vec![&**then];
            arms.extend(otherwise.as_deref());
            union(arms, current, site, options)
        }
        Body::Cond(arms) => union(arms.iter().map(|(_, b)| b), current, site, options),
        Body::Match { arms, .. } => union(arms.iter().map(|(_, b)| b), current, site, options),
        Body::And(_, inner) => union([&**inner], current, site, options),
        Body::Native(_) => {
            if in_branch && options.unrecognized_arms == ArmPolicy::Ignore {
                tracing::warn!("{}: ignoring unanalyzable arm", site);
                Validation::success(BTreeSet::new())
            } else {
                Validation::fail(DeclarationError::UnrecognizedBody {
                    site: site.to_string(),
                })
            }
        }
    }
}

fn union<'a>(
    arms: impl IntoIterator<Item = &'a Body>,
    current: &StateName,
    site: &str,
    options: &CompileOptions,
) -> Analysis {
    let checks: Vec<Analysis> = arms
        .into_iter()
        .map(|arm| walk(arm, current, site, options, true))
        .collect();

    Validation::all_vec(checks).map(|sets| sets.into_iter().flatten().collect())
}
