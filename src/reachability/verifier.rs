use crate::TrapSpaceError;
use crate::network::Network;
use crate::reachability::{
    ExplorationComputation, ExplorationProblem, ReachabilityConfig, ReachabilityVerdict,
    merge_chains, reduce_functions, relevance_closure,
};
use crate::solutions::{ExternalRow, SolutionStore, TrapSpace, expand_row, rows_compatible};
use crate::threshold::ThresholdFunction;
use cancel_this::{Cancellable, is_cancelled};
use computation_process::Algorithm;
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Counters of one verification pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerificationReport {
    /// Trap spaces with at least one inclusion candidate.
    pub checked: usize,
    /// Trap spaces that are redundant under all their external rows.
    pub redundant: usize,
    /// Trap spaces that are redundant only under some of their external rows.
    pub split: usize,
    /// Reachability problems that were too large to explore.
    pub intractable: usize,
    /// Reachability problems answered from the cache.
    pub cached: usize,
    /// Trap spaces removed from the store.
    pub removed: usize,
}

/// Decides candidate inclusions of trap spaces by explicit reachability.
pub struct InclusionVerifier<'a> {
    network: &'a Network,
    functions: &'a [ThresholdFunction],
    config: &'a ReachabilityConfig,
    memo: HashMap<ExplorationProblem, ReachabilityVerdict>,
    report: VerificationReport,
}

impl<'a> InclusionVerifier<'a> {
    pub fn new(
        network: &'a Network,
        functions: &'a [ThresholdFunction],
        config: &'a ReachabilityConfig,
    ) -> InclusionVerifier<'a> {
        InclusionVerifier {
            network,
            functions,
            config,
            memo: HashMap::new(),
            report: VerificationReport::default(),
        }
    }

    pub fn report(&self) -> &VerificationReport {
        &self.report
    }

    /// External positions that influence some free variable of `space`.
    fn key_externals(&self, space: &TrapSpace) -> Vec<usize> {
        let state_size = self.network.state_size();
        (0..self.functions.len())
            .filter(|id| !space.stable.contains_key(id))
            .flat_map(|id| self.functions[id].parents())
            .map(|(id, _)| id)
            .filter(|id| self.network.is_external(*id))
            .map(|id| id - state_size)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Decide whether every state of `stable` (under the external values of `key`) can reach
    /// one of the `targets`.
    pub fn check(
        &mut self,
        stable: &BTreeMap<usize, bool>,
        key: &[Option<bool>],
        targets: &[BTreeMap<usize, bool>],
    ) -> Cancellable<ReachabilityVerdict> {
        let mut reduced = reduce_functions(self.functions, stable, key);
        let seeds = targets
            .iter()
            .flat_map(|it| it.keys())
            .filter(|id| !stable.contains_key(id))
            .copied()
            .collect::<BTreeSet<_>>();
        let merged = merge_chains(&mut reduced, &seeds);
        let relevant = relevance_closure(&reduced, &seeds);
        trace!(
            "Reduced {} free variables to {} relevant ({} merged).",
            self.functions.len().saturating_sub(stable.len()),
            relevant.len(),
            merged
        );
        if relevant.len() > self.config.max_variables {
            warn!(
                "Reachability not verified: {} relevant variables (at most {} supported).",
                relevant.len(),
                self.config.max_variables
            );
            self.report.intractable += 1;
            return Ok(ReachabilityVerdict::Intractable {
                variables: relevant.len(),
            });
        }

        reduced.retain(|id, _| relevant.contains(id));
        let problem = ExplorationProblem::new(&reduced, targets);
        if let Some(verdict) = self.memo.get(&problem) {
            self.report.cached += 1;
            return Ok(*verdict);
        }
        let verdict = ExplorationComputation::run(problem.clone(), &problem)?;
        self.memo.insert(problem, verdict);
        Ok(verdict)
    }

    /// Verify all candidate inclusions of trap space `id`.
    ///
    /// The external rows of the trap space are expanded on the externals that influence its
    /// free variables and grouped by these values. A group is covered if some including trap
    /// space holds under it and is reachable from every state. If all groups are covered, the
    /// trap space is marked as included. If only some are, it is replaced by a copy linked to
    /// the uncovered rows.
    pub fn verify(&mut self, store: &mut SolutionStore, id: usize) -> Result<(), TrapSpaceError> {
        let Some(space) = store.solution(id).cloned() else {
            return Ok(());
        };
        let including = store.inclusions(id).cloned().unwrap_or_default();
        if including.is_empty() {
            return Ok(());
        }
        self.report.checked += 1;

        let positions = self.key_externals(&space);
        if positions.len() > self.config.max_variables {
            warn!(
                "Trap space {id} depends on {} externals; inclusion not verified.",
                positions.len()
            );
            self.report.intractable += 1;
            return Ok(());
        }

        let external_size = self.network.external_size();
        let mut groups: BTreeMap<ExternalRow, Vec<ExternalRow>> = BTreeMap::new();
        for row in store.rows_of(id) {
            for expanded in expand_row(row, &positions) {
                let mut key = vec![None; external_size];
                for position in &positions {
                    key[*position] = expanded[*position];
                }
                groups.entry(key).or_default().push(expanded);
            }
        }

        let mut covered = Vec::new();
        let mut uncovered = Vec::new();
        for (key, rows) in groups {
            is_cancelled!()?;
            let targets = including
                .iter()
                .filter_map(|it| store.solution(*it))
                .filter(|it| covers(store, &space, it, &key))
                .map(|it| it.stable.clone())
                .collect::<Vec<_>>();
            let redundant = !targets.is_empty()
                && self.check(&space.stable, &key, &targets)?.is_redundant();
            if redundant {
                covered.extend(rows);
            } else {
                uncovered.extend(rows);
            }
        }

        if covered.is_empty() {
            trace!("Trap space {id} is not redundant.");
        } else if uncovered.is_empty() {
            trace!("Trap space {id} is redundant.");
            self.report.redundant += 1;
            store.mark_included(id)?;
        } else {
            let copy = store.add_solution(space.stable.clone());
            let external = store.add_fresh_external_set(uncovered);
            store.link(copy, external)?;
            store.mark_included(id)?;
            self.report.split += 1;
            debug!(
                "Trap space {id} is redundant for {} external rows; replaced by {copy}.",
                covered.len()
            );
        }
        Ok(())
    }
}

/// Returns `true` if the including trap space `larger` holds under some external row of
/// `smaller` that agrees with `key`.
fn covers(store: &SolutionStore, smaller: &TrapSpace, larger: &TrapSpace, key: &[Option<bool>]) -> bool {
    let (Some(small_ext), Some(large_ext)) = (
        store.external_of(smaller.id),
        store.external_of(larger.id),
    ) else {
        return false;
    };
    let rows = if small_ext == large_ext {
        store.rows_of(smaller.id)
    } else {
        store
            .compatible_externals(small_ext, large_ext)
            .unwrap_or(&[])
    };
    rows.iter().any(|it| rows_compatible(it, key))
}

/// Verify every candidate inclusion in the store (see [`InclusionVerifier::verify`]) and delete
/// the redundant trap spaces.
///
/// With [`ReachabilityConfig::verify_inclusions`] disabled, every trap space with an inclusion
/// candidate is deleted.
pub fn remove_redundant(
    network: &Network,
    functions: &[ThresholdFunction],
    store: &mut SolutionStore,
    config: &ReachabilityConfig,
) -> Result<VerificationReport, TrapSpaceError> {
    let initial = store.len();
    let mut verifier = InclusionVerifier::new(network, functions, config);
    for id in store.included_solutions() {
        is_cancelled!()?;
        if config.verify_inclusions {
            verifier.verify(store, id)?;
        } else {
            store.mark_included(id)?;
        }
    }
    let mut report = verifier.report;
    report.removed = store.remove_included();
    store.remove_unused_externals()?;
    info!(
        "Removed {} redundant trap spaces ({} remaining of {}; {} split; {} not verified).",
        report.removed,
        store.len(),
        initial,
        report.split,
        report.intractable
    );
    Ok(report)
}
