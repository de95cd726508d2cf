//! External-assignment resolution.
//!
//! The enumerator only reports one external valuation per trap space. Here, every trap space
//! gets the full set of external rows under which it stays a trap space: the externals that
//! are parents of some fixed variable are enumerated exhaustively, and a row is kept iff each
//! fixed variable keeps its value for every valuation of the free state variables. All other
//! externals are irrelevant to the trap space and stay unspecified (`None`).
//!
//! After the redundant trap spaces are removed, [`restore_removed_variables`] extends the
//! remaining ones with the variables removed by the network reduction.

mod restore;

#[cfg(test)]
mod tests;

use crate::enumeration::TrapSpaceCandidate;
use crate::network::Network;
use crate::TrapSpaceError;
use crate::solutions::{ExternalRow, SolutionStore};
use crate::threshold::ThresholdFunction;
use cancel_this::{Cancellable, is_cancelled};
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};

pub use restore::restore_removed_variables;

/// A "flat" configuration object for external resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalsConfig {
    /// If a trap space depends on more externals than this, the row found by the enumerator
    /// is used instead of an exhaustive check (default: `16`).
    pub max_enumerated_inputs: usize,
}

impl Default for ExternalsConfig {
    fn default() -> Self {
        ExternalsConfig::new()
    }
}

impl ExternalsConfig {
    pub fn new() -> ExternalsConfig {
        ExternalsConfig {
            max_enumerated_inputs: 16,
        }
    }
}

/// Returns `true` if every stable node keeps its value under the given external row,
/// regardless of the values of the free state variables.
pub fn is_stable_under(
    network: &Network,
    functions: &[ThresholdFunction],
    stable: &BTreeMap<usize, bool>,
    row: &[Option<bool>],
) -> bool {
    let state_size = network.state_size();
    let known = |id: usize| {
        if id < state_size {
            stable.get(&id).copied()
        } else {
            row.get(id - state_size).copied().flatten()
        }
    };
    stable
        .iter()
        .all(|(id, value)| functions[*id].fixed_output(known) == Some(*value))
}

/// External positions (`id - state_size`) that influence some stable node.
pub fn relevant_externals(
    network: &Network,
    functions: &[ThresholdFunction],
    stable: &BTreeMap<usize, bool>,
) -> Vec<usize> {
    let state_size = network.state_size();
    stable
        .keys()
        .flat_map(|id| functions[*id].parents())
        .map(|(id, _)| id)
        .filter(|id| network.is_external(*id))
        .map(|id| id - state_size)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Compute all external rows under which `stable` is a trap space.
///
/// `fallback` is the valuation chosen by the enumerator. It is used (restricted to the relevant
/// externals) when there are too many relevant externals to enumerate.
pub fn external_rows(
    network: &Network,
    functions: &[ThresholdFunction],
    stable: &BTreeMap<usize, bool>,
    fallback: &[Option<bool>],
    config: &ExternalsConfig,
) -> Cancellable<Vec<ExternalRow>> {
    let external_size = network.external_size();
    let relevant = relevant_externals(network, functions, stable);
    if relevant.len() > config.max_enumerated_inputs {
        warn!(
            "Trap space depends on {} externals; using the enumerated valuation only.",
            relevant.len()
        );
        let mut row = vec![None; external_size];
        for position in &relevant {
            row[*position] = fallback.get(*position).copied().flatten();
        }
        return Ok(vec![row]);
    }

    let mut rows = Vec::new();
    for mask in 0..(1usize << relevant.len()) {
        is_cancelled!()?;
        let mut row = vec![None; external_size];
        for (i, position) in relevant.iter().enumerate() {
            row[*position] = Some((mask >> i) & 1 == 1);
        }
        if is_stable_under(network, functions, stable, &row) {
            rows.push(row);
        }
    }
    trace!(
        "Trap space holds for {}/{} valuations of {} relevant externals.",
        rows.len(),
        1usize << relevant.len(),
        relevant.len()
    );
    Ok(rows)
}

/// Insert enumerated trap spaces into a new store together with their external rows.
pub fn resolve_externals(
    network: &Network,
    functions: &[ThresholdFunction],
    candidates: Vec<TrapSpaceCandidate>,
    config: &ExternalsConfig,
) -> Result<SolutionStore, TrapSpaceError> {
    let mut store = SolutionStore::new();
    for candidate in candidates {
        let rows = external_rows(
            network,
            functions,
            &candidate.stable,
            &candidate.externals,
            config,
        )?;
        let id = store.add_solution(candidate.stable);
        let external = store.add_external_set(rows);
        store.link(id, external)?;
    }
    debug!(
        "Resolved externals of {} trap spaces into {} distinct sets.",
        store.len(),
        store
            .solution_ids()
            .iter()
            .filter_map(|it| store.external_of(*it))
            .collect::<BTreeSet<_>>()
            .len()
    );
    Ok(store)
}
