use crate::TrapSpaceError;
use crate::network::Network;
use crate::solutions::{ExternalRow, SolutionStore};
use cancel_this::is_cancelled;
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};

/// Values of the removed variables that are determined by a trap space and one external row.
fn restored_values(
    network: &Network,
    stable: &BTreeMap<usize, bool>,
    row: &ExternalRow,
) -> BTreeMap<usize, bool> {
    let state_size = network.state_size();
    let mut known = HashMap::new();
    for (id, value) in stable {
        if network.is_state(*id) {
            known.insert(network.name_of(*id).to_string(), *value);
        }
    }
    for (i, value) in row.iter().enumerate() {
        if let Some(value) = value {
            known.insert(network.name_of(state_size + i).to_string(), *value);
        }
    }
    network
        .removed_ids()
        .filter_map(|id| {
            let restricted = network
                .context()
                .restrict(&network.variable(id).function, &known);
            restricted.as_bool().map(|value| (id, value))
        })
        .collect()
}

/// Extend every trap space with the external-only-dependent and hole variables whose values
/// follow from its stable nodes and external rows.
///
/// Rows that determine different values split the trap space into one trap space per distinct
/// restoration, each linked to the corresponding subset of rows.
pub fn restore_removed_variables(
    network: &Network,
    store: &mut SolutionStore,
) -> Result<(), TrapSpaceError> {
    if network.removed_ids().is_empty() {
        return Ok(());
    }

    let mut split = 0;
    for id in store.solution_ids() {
        is_cancelled!()?;
        let Some(space) = store.solution(id) else {
            continue;
        };
        let stable = space.stable.clone();
        let mut groups: BTreeMap<BTreeMap<usize, bool>, Vec<ExternalRow>> = BTreeMap::new();
        for row in store.rows_of(id) {
            groups
                .entry(restored_values(network, &stable, row))
                .or_default()
                .push(row.clone());
        }

        if groups.len() <= 1 {
            if let Some(restored) = groups.keys().next() {
                trace!("Trap space {id} restores {} removed variables.", restored.len());
                store.extend_stable(id, restored)?;
            }
            continue;
        }

        split += 1;
        store.remove_solution(id);
        for (restored, rows) in groups {
            let mut extended = stable.clone();
            extended.extend(restored);
            let new_id = store.add_solution(extended);
            let external = store.add_fresh_external_set(rows);
            store.link(new_id, external)?;
        }
    }
    store.remove_unused_externals()?;
    debug!("Restored removed variables ({split} trap spaces split).");
    Ok(())
}
