use crate::network::{Network, VariableKind};
use log::{debug, info, trace};
use std::collections::BTreeSet;

/// A "flat" configuration object for [`Network::reduce`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReductionConfig {
    /// A variable is only folded into a successor if their combined parent set stays within
    /// this budget (default: `16`).
    pub merge_parent_budget: usize,
    /// Hole folding only runs when the number of state variables is strictly greater than this
    /// value (default: `300`).
    pub hole_reduction_threshold: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig::new()
    }
}

impl ReductionConfig {
    pub fn new() -> ReductionConfig {
        ReductionConfig {
            merge_parent_budget: 16,
            hole_reduction_threshold: 300,
        }
    }
}

impl Network {
    /// Remove state variables that provably do not carry any information for the remaining
    /// state variables.
    ///
    /// First, external-only-dependent variables (no state parents, and each state successor
    /// either shares no parent with them or stays within the parent budget) are folded into
    /// their successors until a fixed point, but the last state variable is never removed.
    /// Then, for large networks only, variables without state successors (holes) are folded
    /// in the same way. Finally, ids are reassigned and holes whose parents are all state
    /// variables are promoted to externals. Static variables are never removed.
    pub fn reduce(&mut self, config: &ReductionConfig) {
        let initial_state_size = self.state_size();
        loop {
            let removed = self.remove_external_only_dependent(config);
            if removed == 0 {
                break;
            }
            debug!(
                "Removed {removed} external-only-dependent variables; {} state variables remaining.",
                self.state_size()
            );
        }

        if self.state_size() > config.hole_reduction_threshold {
            loop {
                let removed = self.remove_holes();
                if removed == 0 {
                    break;
                }
                debug!(
                    "Removed {removed} hole variables; {} state variables remaining.",
                    self.state_size()
                );
            }
        }

        self.reassign_ids();
        let mut promoted = 0;
        for id in self.removed_ids() {
            let parents = self.parent_ids(id);
            if self.variable(id).kind == VariableKind::Hole
                && parents.iter().all(|it| self.is_state(*it))
            {
                self.variable_mut(id).kind = VariableKind::External;
                promoted += 1;
            }
        }
        if promoted > 0 {
            self.reassign_ids();
        }

        info!(
            "Network reduced from {} to {} state variables (external={}; external-only-dependent={}; holes={}; promoted={}).",
            initial_state_size,
            self.state_size(),
            self.external_size(),
            self.names_of_kind(VariableKind::ExternalOnlyDependent).len(),
            self.names_of_kind(VariableKind::Hole).len(),
            promoted,
        );
    }

    fn state_names(&self) -> Vec<String> {
        self.names_of_kind(VariableKind::State)
    }

    fn is_state_name(&self, name: &str) -> bool {
        self.find_variable(name)
            .is_some_and(|it| it.kind == VariableKind::State)
    }

    fn is_static_name(&self, name: &str) -> bool {
        self.find_variable(name).is_some_and(|it| it.is_static)
    }

    fn parents_of(&self, name: &str) -> BTreeSet<String> {
        self.id_of(name)
            .map(|id| self.parent_names(id))
            .unwrap_or_default()
    }

    /// Returns `true` if `name` is a state variable without state parents that can be folded
    /// into all of its state successors.
    fn is_external_only_dependent(&self, name: &str, config: &ReductionConfig) -> bool {
        let parents = self.parents_of(name);
        if self.is_static_name(name) || parents.iter().any(|it| self.is_state_name(it)) {
            return false;
        }
        for successor in self.successors(name) {
            if !self.is_state_name(&successor) {
                continue;
            }
            let successor_parents = self.parents_of(&successor);
            let combined = successor_parents.union(&parents).count();
            if combined > config.merge_parent_budget {
                trace!("`{name}` cannot be merged into `{successor}` ({combined} parents).");
                return false;
            }
            if !successor_parents.is_disjoint(&parents) {
                trace!("`{name}` shares parents with `{successor}`.");
                return false;
            }
        }
        true
    }

    fn remove_external_only_dependent(&mut self, config: &ReductionConfig) -> usize {
        let candidates = self
            .state_names()
            .into_iter()
            .filter(|it| self.is_external_only_dependent(it, config))
            .collect::<Vec<_>>();

        let mut removed = 0;
        for name in candidates {
            if self.state_size() == 1 {
                debug!("Keeping `{name}` as the last state variable.");
                return 0;
            }
            self.fold_out(&name, VariableKind::ExternalOnlyDependent);
            removed += 1;
        }
        removed
    }

    fn remove_holes(&mut self) -> usize {
        let candidates = self
            .state_names()
            .into_iter()
            .filter(|name| !self.is_static_name(name))
            .filter(|name| {
                !self
                    .successors(name)
                    .iter()
                    .any(|it| self.is_state_name(it))
            })
            .collect::<Vec<_>>();

        for name in &candidates {
            let all_external = self.parents_of(name).iter().all(|it| {
                self.find_variable(it)
                    .is_some_and(|var| var.kind == VariableKind::External)
            });
            let kind = if all_external {
                VariableKind::External
            } else {
                VariableKind::Hole
            };
            self.fold_out(name, kind);
        }
        candidates.len()
    }

    /// Substitute the update function of `name` into all its successors and reclassify it.
    fn fold_out(&mut self, name: &str, kind: VariableKind) {
        let Some(id) = self.id_of(name) else {
            return;
        };
        trace!("Folding `{name}` out of the network as {kind:?}.");
        let replacement = self.variable(id).function.clone();
        self.substitute_everywhere(name, &replacement);
        self.variable_mut(id).kind = kind;
    }
}
