use crate::solutions::{ExternalRow, StoreError, TrapSpace};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Owns all trap spaces, all external-assignment sets and the relations between them.
#[derive(Clone, Debug, Default)]
pub struct SolutionStore {
    solutions: BTreeMap<usize, TrapSpace>,
    external_sets: BTreeMap<usize, Vec<ExternalRow>>,
    external_index: HashMap<Vec<ExternalRow>, usize>,
    solution_externals: BTreeMap<usize, usize>,
    inclusions: BTreeMap<usize, BTreeSet<usize>>,
    compatible_externals: HashMap<(usize, usize), Vec<ExternalRow>>,
    next_solution_id: usize,
    next_external_id: usize,
}

impl SolutionStore {
    pub fn new() -> SolutionStore {
        SolutionStore::default()
    }

    /// Insert a new trap space and return its fresh id.
    pub fn add_solution(&mut self, stable: BTreeMap<usize, bool>) -> usize {
        let id = self.next_solution_id;
        self.next_solution_id += 1;
        trace!("Added trap space {id} with {} stable nodes.", stable.len());
        self.solutions.insert(
            id,
            TrapSpace {
                id,
                stable,
                included: false,
            },
        );
        id
    }

    /// Remove a trap space together with its external link and all inclusion edges
    /// that mention it.
    pub fn remove_solution(&mut self, id: usize) -> Option<TrapSpace> {
        let removed = self.solutions.remove(&id)?;
        self.solution_externals.remove(&id);
        self.inclusions.remove(&id);
        for targets in self.inclusions.values_mut() {
            targets.remove(&id);
        }
        Some(removed)
    }

    pub fn solution(&self, id: usize) -> Option<&TrapSpace> {
        self.solutions.get(&id)
    }

    /// All trap spaces ordered by id.
    pub fn solutions(&self) -> impl Iterator<Item = &TrapSpace> {
        self.solutions.values()
    }

    pub fn solution_ids(&self) -> Vec<usize> {
        self.solutions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Register a set of external rows. Rows are sorted and deduplicated, and a set equal to an
    /// already registered one reuses its id.
    pub fn add_external_set(&mut self, mut rows: Vec<ExternalRow>) -> usize {
        rows.sort();
        rows.dedup();
        if let Some(id) = self.external_index.get(&rows) {
            return *id;
        }
        let id = self.next_external_id;
        self.next_external_id += 1;
        self.external_index.insert(rows.clone(), id);
        self.external_sets.insert(id, rows);
        id
    }

    /// Register a set of external rows under a fresh id, even if an equal set exists.
    ///
    /// Rows split off an existing trap space use this, so their set is never shared with an
    /// unrelated trap space. Fresh sets are not found by [`SolutionStore::add_external_set`].
    pub fn add_fresh_external_set(&mut self, mut rows: Vec<ExternalRow>) -> usize {
        rows.sort();
        rows.dedup();
        let id = self.next_external_id;
        self.next_external_id += 1;
        self.external_sets.insert(id, rows);
        id
    }

    /// Remove an external set that is no longer referenced by any trap space.
    pub fn remove_external(&mut self, id: usize) -> Result<Vec<ExternalRow>, StoreError> {
        if let Some((solution, _)) = self.solution_externals.iter().find(|(_, e)| **e == id) {
            return Err(StoreError::ExternalSetInUse {
                external: id,
                solution: *solution,
            });
        }
        let rows = self
            .external_sets
            .remove(&id)
            .ok_or(StoreError::UnknownExternalSet(id))?;
        if self.external_index.get(&rows) == Some(&id) {
            self.external_index.remove(&rows);
        }
        self.compatible_externals
            .retain(|(a, b), _| *a != id && *b != id);
        Ok(rows)
    }

    /// Associate a trap space with an external set, replacing any previous association.
    pub fn link(&mut self, solution: usize, external: usize) -> Result<(), StoreError> {
        if !self.solutions.contains_key(&solution) {
            return Err(StoreError::UnknownSolution(solution));
        }
        if !self.external_sets.contains_key(&external) {
            return Err(StoreError::UnknownExternalSet(external));
        }
        self.solution_externals.insert(solution, external);
        Ok(())
    }

    pub fn external_of(&self, solution: usize) -> Option<usize> {
        self.solution_externals.get(&solution).copied()
    }

    pub fn external_rows(&self, external: usize) -> Option<&[ExternalRow]> {
        self.external_sets.get(&external).map(|it| it.as_slice())
    }

    /// Rows of the external set linked to `solution` (empty if there is no link).
    pub fn rows_of(&self, solution: usize) -> &[ExternalRow] {
        self.external_of(solution)
            .and_then(|it| self.external_rows(it))
            .unwrap_or(&[])
    }

    /// Positions where at least one row of the set has a concrete value.
    pub fn not_null_externals(&self, external: usize) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();
        for row in self.external_rows(external).unwrap_or(&[]) {
            for (i, value) in row.iter().enumerate() {
                if value.is_some() {
                    result.insert(i);
                }
            }
        }
        result
    }

    /// Replace the set of larger trap spaces that `solution` is a candidate inclusion of.
    pub fn set_inclusions(&mut self, solution: usize, including: BTreeSet<usize>) {
        if including.is_empty() {
            self.inclusions.remove(&solution);
        } else {
            self.inclusions.insert(solution, including);
        }
    }

    pub fn inclusions(&self, solution: usize) -> Option<&BTreeSet<usize>> {
        self.inclusions.get(&solution)
    }

    /// Ids of trap spaces with at least one inclusion candidate.
    pub fn included_solutions(&self) -> Vec<usize> {
        self.inclusions.keys().copied().collect()
    }

    pub fn clear_inclusions(&mut self) {
        self.inclusions.clear();
    }

    pub fn compatible_externals(&self, smaller: usize, larger: usize) -> Option<&[ExternalRow]> {
        self.compatible_externals
            .get(&(smaller, larger))
            .map(|it| it.as_slice())
    }

    pub fn set_compatible_externals(&mut self, smaller: usize, larger: usize, rows: Vec<ExternalRow>) {
        self.compatible_externals.insert((smaller, larger), rows);
    }

    /// Add further stable nodes to an existing trap space.
    pub fn extend_stable(
        &mut self,
        solution: usize,
        stable: &BTreeMap<usize, bool>,
    ) -> Result<(), StoreError> {
        let space = self
            .solutions
            .get_mut(&solution)
            .ok_or(StoreError::UnknownSolution(solution))?;
        space.stable.extend(stable.iter().map(|(k, v)| (*k, *v)));
        Ok(())
    }

    pub fn mark_included(&mut self, solution: usize) -> Result<(), StoreError> {
        let space = self
            .solutions
            .get_mut(&solution)
            .ok_or(StoreError::UnknownSolution(solution))?;
        space.included = true;
        Ok(())
    }

    /// Delete every trap space marked as included and return how many were deleted.
    pub fn remove_included(&mut self) -> usize {
        let included = self
            .solutions
            .values()
            .filter(|it| it.included)
            .map(|it| it.id)
            .collect::<Vec<_>>();
        for id in &included {
            self.remove_solution(*id);
        }
        debug!("Removed {} included trap spaces.", included.len());
        included.len()
    }

    /// Drop external sets that are no longer referenced by any trap space and return how many
    /// were dropped.
    pub fn remove_unused_externals(&mut self) -> Result<usize, StoreError> {
        let used = self
            .solution_externals
            .values()
            .copied()
            .collect::<BTreeSet<_>>();
        let unused = self
            .external_sets
            .keys()
            .copied()
            .filter(|it| !used.contains(it))
            .collect::<Vec<_>>();
        for id in &unused {
            self.remove_external(*id)?;
        }
        trace!("Removed {} unused external sets.", unused.len());
        Ok(unused.len())
    }
}
