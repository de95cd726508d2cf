//! The solution store: trap spaces, their external-assignment sets and the inclusion
//! relation between them.
//!
//! Trap space ids and external set ids are allocated from two monotonically increasing
//! counters and never reused. Every trap space references exactly one external set (once
//! linked). Identical external sets (same rows, ignoring order) share one id, except for the
//! rows split off an existing trap space, which always get a fresh set.

mod store;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use thiserror::Error;

pub use store::SolutionStore;

/// One assignment of the external variables, indexed by `id - state_size`.
///
/// `None` means the value of that external variable does not matter.
pub type ExternalRow = Vec<Option<bool>>;

/// A partial assignment of state variables that is invariant under the network dynamics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapSpace {
    pub id: usize,
    /// The stable nodes: fixed state variable ids and their values.
    pub stable: BTreeMap<usize, bool>,
    /// Set once a strictly larger trap space is known to cover this one.
    pub included: bool,
}

impl TrapSpace {
    pub fn size(&self) -> usize {
        self.stable.len()
    }

    /// Returns `true` if every stable node of `self` is also stable in `other`
    /// with the same value.
    pub fn agrees_with(&self, other: &TrapSpace) -> bool {
        self.stable
            .iter()
            .all(|(id, value)| other.stable.get(id) == Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("trap space {0} does not exist")]
    UnknownSolution(usize),
    #[error("external set {0} does not exist")]
    UnknownExternalSet(usize),
    #[error("external set {external} is still used by trap space {solution}")]
    ExternalSetInUse { external: usize, solution: usize },
}

/// Returns `true` if two rows agree on every position where both are specified.
pub fn rows_compatible(left: &[Option<bool>], right: &[Option<bool>]) -> bool {
    left.iter().zip(right).all(|(l, r)| match (l, r) {
        (Some(l), Some(r)) => l == r,
        _ => true,
    })
}

/// Expand the `None` entries of `row` at the given `positions` into all concrete values.
pub fn expand_row(row: &[Option<bool>], positions: &[usize]) -> Vec<ExternalRow> {
    let mut result = vec![row.to_vec()];
    for position in positions {
        if row.get(*position).is_some_and(|it| it.is_none()) {
            result = result
                .into_iter()
                .flat_map(|r| {
                    let mut zero = r.clone();
                    let mut one = r;
                    zero[*position] = Some(false);
                    one[*position] = Some(true);
                    [zero, one]
                })
                .collect();
        }
    }
    result
}
