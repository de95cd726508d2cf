use crate::threshold::ThresholdFunction;
use log::trace;
use std::collections::{BTreeMap, BTreeSet};

/// A threshold function restricted to the free state variables of a trap space.
///
/// The contributions of stable nodes and of external variables are subtracted from the
/// threshold, so `weights` only mentions free variables.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReducedFunction {
    pub weights: BTreeMap<usize, i64>,
    pub threshold: i64,
}

/// Reduced functions of all free variables, keyed by variable id.
pub type ReducedNetwork = BTreeMap<usize, ReducedFunction>;

impl ReducedFunction {
    /// Restrict `function` to the state variables not fixed by `stable`, using the concrete
    /// entries of `externals`. Unknown externals do not contribute.
    pub fn restrict(
        function: &ThresholdFunction,
        state_size: usize,
        stable: &BTreeMap<usize, bool>,
        externals: &[Option<bool>],
    ) -> ReducedFunction {
        let mut weights = BTreeMap::new();
        let mut threshold = function.threshold;
        for (id, weight) in function.parents() {
            let known = if id < state_size {
                match stable.get(&id) {
                    Some(value) => Some(*value),
                    None => {
                        weights.insert(id, weight);
                        continue;
                    }
                }
            } else {
                externals.get(id - state_size).copied().flatten()
            };
            if known == Some(true) {
                threshold -= weight;
            }
        }
        ReducedFunction { weights, threshold }
    }

    pub fn evaluate(&self, value: impl Fn(usize) -> bool) -> bool {
        let sum: i64 = self
            .weights
            .iter()
            .filter(|(id, _)| value(**id))
            .map(|(_, w)| *w)
            .sum();
        sum >= self.threshold
    }
}

/// Restrict the state functions to the variables that are free in `stable`.
pub fn reduce_functions(
    functions: &[ThresholdFunction],
    stable: &BTreeMap<usize, bool>,
    externals: &[Option<bool>],
) -> ReducedNetwork {
    functions
        .iter()
        .enumerate()
        .filter(|(id, _)| !stable.contains_key(id))
        .map(|(id, f)| {
            (
                id,
                ReducedFunction::restrict(f, functions.len(), stable, externals),
            )
        })
        .collect()
}

fn successors(network: &ReducedNetwork) -> BTreeMap<usize, BTreeSet<usize>> {
    let mut result = network
        .keys()
        .map(|id| (*id, BTreeSet::new()))
        .collect::<BTreeMap<_, _>>();
    for (child, function) in network {
        for parent in function.weights.keys() {
            result.entry(*parent).or_default().insert(*child);
        }
    }
    result
}

/// Find a variable `v` with a single parent `p` and a single child `c` such that `v` simply
/// copies the value of `p`.
fn find_chain(
    network: &ReducedNetwork,
    successors: &BTreeMap<usize, BTreeSet<usize>>,
    protected: &BTreeSet<usize>,
) -> Option<(usize, usize, usize)> {
    network.iter().find_map(|(v, function)| {
        if protected.contains(v) || function.weights.len() != 1 {
            return None;
        }
        let (p, w_in) = function.weights.iter().next()?;
        let children = successors.get(v)?;
        if children.len() != 1 {
            return None;
        }
        let c = *children.iter().next()?;
        if *p == *v || c == *v || c == *p {
            return None;
        }
        let w_out = network.get(&c)?.weights.get(v).copied()?;
        let copies = function.threshold >= 1 && function.threshold <= *w_in;
        (*w_in >= 1 && w_out >= 1 && copies).then_some((*v, *p, c))
    })
}

/// Simplify the reduced network without touching the `protected` variables.
///
/// Variables without successors are dropped. A variable on a chain `p -> v -> c` that only
/// copies `p` is eliminated and its weight in `c` is moved to `p`. Repeats until no rule
/// applies and returns the number of eliminated variables.
pub fn merge_chains(network: &mut ReducedNetwork, protected: &BTreeSet<usize>) -> usize {
    let mut removed = 0;
    loop {
        let successors = successors(network);
        let leaf = network
            .keys()
            .copied()
            .find(|id| !protected.contains(id) && successors.get(id).is_none_or(|it| it.is_empty()));
        if let Some(leaf) = leaf {
            trace!("Dropping variable {leaf} without successors.");
            network.remove(&leaf);
            removed += 1;
            continue;
        }

        let Some((v, p, c)) = find_chain(network, &successors, protected) else {
            break;
        };
        trace!("Merging chain {p} -> {v} -> {c}.");
        if let Some(child) = network.get_mut(&c) {
            let weight = child.weights.remove(&v).unwrap_or(0);
            let merged = child.weights.entry(p).or_insert(0);
            *merged += weight;
            if *merged == 0 {
                child.weights.remove(&p);
            }
        }
        network.remove(&v);
        removed += 1;
    }
    removed
}

/// The `seeds` (restricted to the network) together with all their transitive parents.
pub fn relevance_closure(network: &ReducedNetwork, seeds: &BTreeSet<usize>) -> BTreeSet<usize> {
    let mut result = seeds
        .iter()
        .copied()
        .filter(|it| network.contains_key(it))
        .collect::<BTreeSet<_>>();
    let mut stack = result.iter().copied().collect::<Vec<_>>();
    while let Some(id) = stack.pop() {
        let Some(function) = network.get(&id) else {
            continue;
        };
        for parent in function.weights.keys() {
            if network.contains_key(parent) && result.insert(*parent) {
                stack.push(*parent);
            }
        }
    }
    result
}
