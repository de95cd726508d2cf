//! The inclusion hierarchy of trap spaces.
//!
//! A trap space `S` is a candidate inclusion of a strictly larger trap space `B` when every
//! stable node of `S` has the same value in `B` and both can hold under a common external
//! assignment. Trap spaces linked to the same non-empty external set always can. Otherwise, the rows of
//! `S` are expanded to concrete values on every external position specified by `B`, and the
//! expanded rows that agree with some row of `B` are the *compatible rows* of the pair. These
//! are cached in the [`SolutionStore`] per pair of external sets, since many trap spaces share
//! the same sets.

#[cfg(test)]
mod tests;

use crate::solutions::{ExternalRow, SolutionStore, TrapSpace, expand_row, rows_compatible};
use cancel_this::{Cancellable, is_cancelled};
use log::{debug, trace};
use std::collections::BTreeSet;

/// Rows of the `smaller` external set (expanded on the positions specified by `larger`) that
/// agree with at least one row of the `larger` set.
pub fn compatible_rows(store: &SolutionStore, smaller: usize, larger: usize) -> Vec<ExternalRow> {
    let positions = store
        .not_null_externals(larger)
        .into_iter()
        .collect::<Vec<_>>();
    let larger_rows = store.external_rows(larger).unwrap_or(&[]);
    let mut result = Vec::new();
    for row in store.external_rows(smaller).unwrap_or(&[]) {
        for expanded in expand_row(row, &positions) {
            if larger_rows.iter().any(|it| rows_compatible(it, &expanded)) {
                result.push(expanded);
            }
        }
    }
    result
}

/// Returns `true` if the trap spaces `smaller` and `larger` are linked to external sets that
/// admit a common assignment, filling the compatible-rows cache on the way.
fn externals_compatible(store: &mut SolutionStore, smaller: usize, larger: usize) -> bool {
    let (Some(small_ext), Some(large_ext)) = (store.external_of(smaller), store.external_of(larger))
    else {
        return false;
    };
    if small_ext == large_ext {
        return !store.rows_of(smaller).is_empty();
    }
    if let Some(rows) = store.compatible_externals(small_ext, large_ext) {
        return !rows.is_empty();
    }
    let rows = compatible_rows(store, small_ext, large_ext);
    trace!(
        "External sets {small_ext} and {large_ext} share {} compatible rows.",
        rows.len()
    );
    let compatible = !rows.is_empty();
    store.set_compatible_externals(small_ext, large_ext, rows);
    compatible
}

/// Recompute the candidate inclusions of every trap space in the store.
///
/// Returns the total number of inclusion edges.
pub fn build_hierarchy(store: &mut SolutionStore) -> Cancellable<usize> {
    store.clear_inclusions();
    let mut ordered = store.solutions().cloned().collect::<Vec<TrapSpace>>();
    ordered.sort_by_key(|it| it.size());

    let mut edges = 0;
    for (i, smaller) in ordered.iter().enumerate() {
        is_cancelled!()?;
        let mut including = BTreeSet::new();
        for larger in &ordered[(i + 1)..] {
            if larger.size() <= smaller.size() || !smaller.agrees_with(larger) {
                continue;
            }
            if externals_compatible(store, smaller.id, larger.id) {
                including.insert(larger.id);
            }
        }
        if !including.is_empty() {
            trace!(
                "Trap space {} is a candidate inclusion of {:?}.",
                smaller.id,
                including
            );
        }
        edges += including.len();
        store.set_inclusions(smaller.id, including);
    }

    debug!(
        "Built trap space hierarchy with {edges} inclusion edges ({} trap spaces included).",
        store.included_solutions().len()
    );
    Ok(edges)
}
