//! Verification of candidate inclusions by explicit-state reachability.
//!
//! A trap space `S` with inclusion candidates `B_1, ..., B_n` is *redundant* if every state of
//! `S` can reach some `B_i` in the asynchronous dynamics of the network. Such a trap space
//! adds no information and is removed. The check works on a heavily reduced problem:
//!
//!  1. Every threshold function of a variable that is free in `S` is restricted to the free
//!     variables ([`ReducedFunction`]); stable nodes and external values only shift the
//!     threshold.
//!  2. Variables without successors are dropped and chains `p -> v -> c` where `v` only copies
//!     `p` are merged ([`merge_chains`]). Variables fixed by some `B_i` are never removed.
//!  3. Only the variables fixed by some `B_i` and their transitive parents are relevant
//!     ([`relevance_closure`]). If there are more than
//!     [`ReachabilityConfig::max_variables`] of them, the check is refused
//!     ([`ReachabilityVerdict::Intractable`]) and `S` is kept.
//!  4. The hypercube of the relevant variables is searched backwards from the states of the
//!     including trap spaces, one layer per step ([`ExplorationComputation`]). `S` is redundant
//!     iff the whole hypercube is visited.
//!
//! Verdicts are memoized by the whole [`ExplorationProblem`], since structurally identical
//! problems are common across trap spaces.
//!
//! ```no_run
//! use biodivine_algo_threshold_traps::reachability::{
//!     ExplorationComputation, ExplorationProblem, ReducedFunction, ReducedNetwork,
//! };
//! use computation_process::Algorithm;
//! use std::collections::BTreeMap;
//!
//! // `x0 := x1` and `x1 := x0`; can every state reach `x0 = x1 = 1`?
//! let network = ReducedNetwork::from([
//!     (0, ReducedFunction { weights: BTreeMap::from([(1, 1)]), threshold: 1 }),
//!     (1, ReducedFunction { weights: BTreeMap::from([(0, 1)]), threshold: 1 }),
//! ]);
//! let target = BTreeMap::from([(0, true), (1, true)]);
//! let problem = ExplorationProblem::new(&network, &[target]);
//! let verdict = ExplorationComputation::run(problem.clone(), &problem).unwrap();
//! assert!(!verdict.is_redundant());
//! ```

mod exploration;
mod reachability_config;
mod reduced_function;
mod verifier;


use computation_process::Computation;

pub use exploration::{BackwardExploration, ExplorationProblem, ExplorationState};
pub use reachability_config::ReachabilityConfig;
pub use reduced_function::{
    ReducedFunction, ReducedNetwork, merge_chains, reduce_functions, relevance_closure,
};
pub use verifier::{InclusionVerifier, VerificationReport, remove_redundant};

/// The outcome of one reachability check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReachabilityVerdict {
    /// Every state can reach an including trap space.
    Redundant,
    /// Some states cannot reach any including trap space.
    NotRedundant { unreachable: usize },
    /// The problem has too many relevant variables and was not explored.
    Intractable { variables: usize },
}

impl ReachabilityVerdict {
    pub fn is_redundant(&self) -> bool {
        matches!(self, ReachabilityVerdict::Redundant)
    }
}

/// Backward breadth-first exploration of an [`ExplorationProblem`].
pub type ExplorationComputation = Computation<
    ExplorationProblem,
    ExplorationState,
    ReachabilityVerdict,
    BackwardExploration,
>;
