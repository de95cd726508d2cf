use crate::enumeration::{EnumerationConfig, EnumerationState};
use crate::ilp::SolveStatus;
use crate::log_space;
use crate::solutions::ExternalRow;
use cancel_this::is_cancelled;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, GeneratorStep};
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;

/// One trap space found by the enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapSpaceCandidate {
    /// Fixed state variables and their values.
    pub stable: BTreeMap<usize, bool>,
    /// The external values chosen by the solver for this trap space (`None` for the empty
    /// sentinel, where no solver model exists).
    pub externals: ExternalRow,
}

/// Step implementation of [`crate::enumeration::TrapSpaceEnumeration`].
///
/// Every step solves the integer program of the current fixed-set size once. A solution is
/// reported and excluded from the following steps; an infeasible program moves to the next
/// smaller size. The program of one size is built once and only receives new exclusion cuts
/// between steps.
pub struct EnumerationStep;

impl GeneratorStep<EnumerationConfig, EnumerationState, TrapSpaceCandidate> for EnumerationStep {
    fn step(
        context: &EnumerationConfig,
        state: &mut EnumerationState,
    ) -> Completable<Option<TrapSpaceCandidate>> {
        if state.finished {
            return Ok(None);
        }
        is_cancelled!()?;

        let model = state
            .model
            .prepare(context, state.size, &state.exclusions);
        let status = model.solve();
        if let SolveStatus::Optimal(solution) = &status {
            let candidate = model.extract(solution);
            trace!(
                "[size:{}] Found trap space ({}).",
                state.size,
                log_space(candidate.stable.len(), context.state_size())
            );
            state.exclusions.push(candidate.stable.clone());
            state.found += 1;
            return Ok(Some(candidate));
        }

        if let SolveStatus::Unknown(reason) = &status {
            warn!("[size:{}] Solver returned unknown: {reason}.", state.size);
        }
        debug!(
            "[size:{}] Finished with {} trap spaces.",
            state.size,
            state.exclusions.len()
        );

        if state.size == 0 {
            state.finished = true;
            if state.found == 0 {
                info!("No trap space found; reporting the empty trap space.");
                state.found += 1;
                return Ok(Some(TrapSpaceCandidate {
                    stable: BTreeMap::new(),
                    externals: vec![None; context.network.external_size()],
                }));
            }
            return Ok(None);
        }

        state.size -= 1;
        state.exclusions.clear();
        state.model.clear();
        Err(Suspended)
    }
}
