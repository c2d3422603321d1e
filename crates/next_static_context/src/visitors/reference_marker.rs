use std::collections::HashSet;

use swc_core::ecma::ast::Id;
use tracing::debug;

use crate::binding::BindingIndex;

/// Snapshot of the bindings that are referenced right now. Only these may be
/// swept later: a binding nobody used before the export went away can't have
/// been kept alive by it.
pub fn mark_candidates(index: &BindingIndex) -> HashSet<Id> {
    let candidates = index
        .bindings()
        .filter(|binding| index.is_externally_referenced(&binding.id))
        .map(|binding| binding.id)
        .collect::<HashSet<_>>();
    debug!(
        "marked {} of {} bindings as candidates",
        candidates.len(),
        index.len()
    );
    candidates
}
