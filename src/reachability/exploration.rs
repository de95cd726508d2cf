use crate::reachability::{ReachabilityVerdict, ReducedFunction, ReducedNetwork};
use crate::simple_type_name;
use cancel_this::is_cancelled;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};

/// An explicit-state reachability problem over a small set of free variables.
///
/// A state is a bit vector where bit `i` is the value of `variables[i]`. The problem is also
/// used as the memoization key of the verifier, so all parts are kept in a canonical order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationProblem {
    /// Network ids of the explored variables (sorted).
    pub variables: Vec<usize>,
    /// Update functions of the explored variables with weights keyed by bit position.
    pub functions: Vec<ReducedFunction>,
    /// Partial states (by bit position) of the including trap spaces (sorted, unique).
    pub targets: Vec<Vec<Option<bool>>>,
}

impl ExplorationProblem {
    /// Build the problem of reaching one of the `targets` in the given (parent-closed)
    /// reduced network.
    pub fn new(network: &ReducedNetwork, targets: &[BTreeMap<usize, bool>]) -> ExplorationProblem {
        let variables = network.keys().copied().collect::<Vec<_>>();
        let position = variables
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect::<HashMap<_, _>>();
        let functions = network
            .values()
            .map(|f| ReducedFunction {
                weights: f
                    .weights
                    .iter()
                    .filter_map(|(id, w)| position.get(id).map(|p| (*p, *w)))
                    .collect(),
                threshold: f.threshold,
            })
            .collect();
        let mut targets = targets
            .iter()
            .map(|t| variables.iter().map(|id| t.get(id).copied()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        targets.sort();
        targets.dedup();
        ExplorationProblem {
            variables,
            functions,
            targets,
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Number of states of the explored hypercube.
    pub fn state_count(&self) -> usize {
        1usize << self.len()
    }

    /// The value of variable `var` after updating it in `state`.
    pub fn update(&self, var: usize, state: usize) -> bool {
        self.functions[var].evaluate(|p| (state >> p) & 1 == 1)
    }

    /// Returns `true` if `state` belongs to one of the target trap spaces.
    pub fn is_target(&self, state: usize) -> bool {
        self.targets.iter().any(|target| {
            target.iter().enumerate().all(|(i, value)| match value {
                Some(value) => ((state >> i) & 1 == 1) == *value,
                None => true,
            })
        })
    }
}

/// The state of a backward breadth-first exploration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationState {
    pub layer: usize,
    /// One bit per state of the hypercube.
    pub visited: Vec<u64>,
    pub visited_count: usize,
    /// States discovered in the last layer.
    pub frontier: Vec<usize>,
}

impl ExplorationState {
    pub fn is_visited(&self, state: usize) -> bool {
        (self.visited[state / 64] >> (state % 64)) & 1 == 1
    }

    fn visit(&mut self, state: usize) {
        self.visited[state / 64] |= 1 << (state % 64);
        self.visited_count += 1;
        self.frontier.push(state);
    }
}

impl From<&ExplorationProblem> for ExplorationState {
    /// The initial state: every state of every target trap space is visited.
    fn from(value: &ExplorationProblem) -> Self {
        let count = value.state_count();
        let mut state = ExplorationState {
            layer: 0,
            visited: vec![0; count.div_ceil(64)],
            visited_count: 0,
            frontier: Vec::new(),
        };
        for s in 0..count {
            if value.is_target(s) {
                state.visit(s);
            }
        }
        state
    }
}

/// One layer of backward breadth-first search in the asynchronous dynamics of an
/// [`ExplorationProblem`].
///
/// A state `x` is a predecessor of `y` if they differ in exactly one variable `i` and updating
/// `i` in `x` yields its value in `y`. The search finishes once the whole hypercube is visited
/// (the targets are reachable from everywhere) or no new state is found.
///
/// Searching backward from the target states visits exactly the states that can reach a
/// target. So "the whole hypercube is visited" answers the forward question: can every state
/// of the checked trap space reach one of the including trap spaces? A forward search would
/// have to be repeated from every state, while one backward pass decides it for all of them.
pub struct BackwardExploration;

impl ComputationStep<ExplorationProblem, ExplorationState, ReachabilityVerdict>
    for BackwardExploration
{
    fn step(
        context: &ExplorationProblem,
        state: &mut ExplorationState,
    ) -> Completable<ReachabilityVerdict> {
        let total = context.state_count();
        if state.visited_count == total {
            debug!(
                "[layer:{}] {}<{}> finished (all {} states reach a target).",
                state.layer,
                simple_type_name::<BackwardExploration>(),
                context.len(),
                total
            );
            return Ok(ReachabilityVerdict::Redundant);
        }
        if state.frontier.is_empty() {
            debug!(
                "[layer:{}] {}<{}> finished ({}/{} states reach a target).",
                state.layer,
                simple_type_name::<BackwardExploration>(),
                context.len(),
                state.visited_count,
                total
            );
            return Ok(ReachabilityVerdict::NotRedundant {
                unreachable: total - state.visited_count,
            });
        }
        is_cancelled!()?;

        state.layer += 1;
        let frontier = std::mem::take(&mut state.frontier);
        for target in frontier {
            for var in 0..context.len() {
                let source = target ^ (1 << var);
                if state.is_visited(source) {
                    continue;
                }
                let value = (target >> var) & 1 == 1;
                if context.update(var, source) == value {
                    state.visit(source);
                }
            }
        }

        trace!(
            "[layer:{}] {}<{}> increased to {}/{} states.",
            state.layer,
            simple_type_name::<BackwardExploration>(),
            context.len(),
            state.visited_count,
            total
        );
        Err(Suspended)
    }
}
