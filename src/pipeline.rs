//! The end-to-end trap space computation.
//!
//! [`find_trap_spaces`] runs all stages in order: network reduction, threshold synthesis,
//! trap space enumeration, external resolution, inclusion hierarchy, reachability
//! verification and, finally, restoration of the variables removed by the reduction.

use crate::TrapSpaceError;
use crate::enumeration::{EnumerationConfig, enumerate_trap_spaces};
use crate::externals::{ExternalsConfig, resolve_externals, restore_removed_variables};
use crate::hierarchy::build_hierarchy;
use crate::network::{Network, ReductionConfig, VariableKind};
use crate::reachability::{ReachabilityConfig, VerificationReport, remove_redundant};
use crate::solutions::SolutionStore;
use crate::threshold::{SynthesisConfig, synthesize_network};
use log::{debug, info};
use std::collections::BTreeMap;


/// A "flat" configuration object bundling the configuration of every stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapSpaceConfig {
    pub reduction: ReductionConfig,
    pub synthesis: SynthesisConfig,
    pub externals: ExternalsConfig,
    pub reachability: ReachabilityConfig,
    /// The largest fixed-set size that is enumerated (default: all state variables).
    pub max_size: Option<usize>,
}

impl TrapSpaceConfig {
    pub fn new() -> TrapSpaceConfig {
        TrapSpaceConfig::default()
    }
}

/// Statistics of one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapSpaceSummary {
    pub state_variables: usize,
    pub external_variables: usize,
    pub external_only_dependent: usize,
    pub holes: usize,
    /// Trap spaces reported by the enumeration.
    pub found: usize,
    /// Trap spaces remaining after verification and restoration.
    pub kept: usize,
    /// Kept trap spaces that fix every state variable.
    pub fixed_points: usize,
    /// Kept trap spaces with at least one free state variable.
    pub larger_spaces: usize,
    /// Number of kept trap spaces by the number of fixed state variables.
    pub size_histogram: BTreeMap<usize, usize>,
    pub verification: VerificationReport,
}

impl TrapSpaceSummary {
    pub fn new(
        network: &Network,
        store: &SolutionStore,
        found: usize,
        verification: VerificationReport,
    ) -> TrapSpaceSummary {
        let count = |kind: VariableKind| {
            network
                .variables()
                .iter()
                .filter(|it| it.kind == kind)
                .count()
        };
        let state_size = network.state_size();
        let mut size_histogram = BTreeMap::new();
        for space in store.solutions() {
            let fixed = space
                .stable
                .keys()
                .filter(|id| network.is_state(**id))
                .count();
            *size_histogram.entry(fixed).or_insert(0) += 1;
        }
        let fixed_points = size_histogram.get(&state_size).copied().unwrap_or(0);
        TrapSpaceSummary {
            state_variables: state_size,
            external_variables: network.external_size(),
            external_only_dependent: count(VariableKind::ExternalOnlyDependent),
            holes: count(VariableKind::Hole),
            found,
            kept: store.len(),
            fixed_points,
            larger_spaces: store.len() - fixed_points,
            size_histogram,
            verification,
        }
    }

    /// Human-readable multi-line rendering of the summary.
    pub fn describe(&self) -> String {
        let histogram = self
            .size_histogram
            .iter()
            .rev()
            .map(|(size, count)| format!("{size}:{count}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Variables: {} state, {} external, {} external-only-dependent, {} holes.\n\
             Trap spaces: {} kept of {} found ({} fixed points, {} larger).\n\
             Fixed-set sizes: {}.",
            self.state_variables,
            self.external_variables,
            self.external_only_dependent,
            self.holes,
            self.kept,
            self.found,
            self.fixed_points,
            self.larger_spaces,
            histogram
        )
    }
}

/// The outcome of [`find_trap_spaces`].
#[derive(Clone, Debug)]
pub struct TrapSpaceResult {
    /// The reduced network with synthesized threshold functions. Ids in `store` refer to it.
    pub network: Network,
    pub store: SolutionStore,
    pub summary: TrapSpaceSummary,
}

impl TrapSpaceResult {
    /// Render trap space `id` as `name=value` pairs, followed by its external rows
    /// (in brackets, only when some external value matters).
    pub fn describe(&self, id: usize) -> Option<String> {
        let space = self.store.solution(id)?;
        let stable = space
            .stable
            .iter()
            .map(|(var, value)| format!("{}={}", self.network.name_of(*var), u8::from(*value)))
            .collect::<Vec<_>>()
            .join(" ");
        let state_size = self.network.state_size();
        let rows = self
            .store
            .rows_of(id)
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter_map(|(i, value)| {
                        value.map(|value| {
                            format!("{}={}", self.network.name_of(state_size + i), u8::from(value))
                        })
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|it| !it.is_empty())
            .collect::<Vec<_>>();
        let stable = if stable.is_empty() {
            "*".to_string()
        } else {
            stable
        };
        if rows.is_empty() {
            Some(stable)
        } else {
            Some(format!("{stable} [{}]", rows.join("; ")))
        }
    }

    /// All kept trap spaces, rendered by [`TrapSpaceResult::describe`], largest fixed set first.
    pub fn describe_all(&self) -> Vec<String> {
        let mut ids = self.store.solution_ids();
        ids.sort_by_key(|id| {
            let size = self.store.solution(*id).map(|it| it.size()).unwrap_or(0);
            (usize::MAX - size, *id)
        });
        ids.into_iter().filter_map(|id| self.describe(id)).collect()
    }
}

/// Compute the non-redundant trap spaces of `network`.
pub fn find_trap_spaces(
    mut network: Network,
    config: &TrapSpaceConfig,
) -> Result<TrapSpaceResult, TrapSpaceError> {
    info!("Loaded network with {} variables.", network.len());
    network.reduce(&config.reduction);
    synthesize_network(&mut network, &config.synthesis)?;

    let mut enumeration = EnumerationConfig::new(network.clone())?;
    enumeration.max_size = config.max_size;
    let functions = enumeration.functions.clone();
    let candidates = enumerate_trap_spaces(enumeration)?;
    let found = candidates.len();

    let mut store = resolve_externals(&network, &functions, candidates, &config.externals)?;
    let edges = build_hierarchy(&mut store)?;
    debug!("Inclusion hierarchy has {edges} candidate edges.");
    let verification = remove_redundant(&network, &functions, &mut store, &config.reachability)?;
    restore_removed_variables(&network, &mut store)?;

    let summary = TrapSpaceSummary::new(&network, &store, found, verification);
    for line in summary.describe().lines() {
        info!("{line}");
    }
    Ok(TrapSpaceResult {
        network,
        store,
        summary,
    })
}
