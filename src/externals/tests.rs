use crate::enumeration::{EnumerationConfig, TrapSpaceCandidate, enumerate_trap_spaces};
use crate::externals::{
    ExternalsConfig, external_rows, is_stable_under, relevant_externals, resolve_externals,
    restore_removed_variables,
};
use crate::network::{Network, ReductionConfig, VariableKind};
use crate::solutions::SolutionStore;
use crate::test_utils::{TrapSpaceOracle, init_logger, prepare_network};
use crate::threshold::ThresholdFunction;
use crate::TrapSpaceError;
use std::collections::BTreeMap;

/// `D` only depends on the external `E`, so the reduction folds it into `B`.
const WITH_REMOVED: &str = "A*=A | E\nB*=A & D\nD*=E\nE*=E\n";

fn prepare() -> (Network, Vec<ThresholdFunction>) {
    let network = prepare_network(WITH_REMOVED, &ReductionConfig::default());
    let functions = EnumerationConfig::new(network.clone()).unwrap().functions;
    (network, functions)
}

fn stable(values: &[(usize, bool)]) -> BTreeMap<usize, bool> {
    values.iter().copied().collect()
}

#[test]
fn reduced_network_layout() {
    init_logger();
    let (network, functions) = prepare();
    assert_eq!(network.names_of_kind(VariableKind::State), vec!["A", "B"]);
    assert_eq!(network.names_of_kind(VariableKind::External), vec!["E"]);
    assert_eq!(
        network.names_of_kind(VariableKind::ExternalOnlyDependent),
        vec!["D"]
    );
    assert_eq!(functions.len(), 2);
}

#[test]
fn relevant_externals_follow_stable_parents() {
    init_logger();
    let (network, functions) = prepare();
    assert_eq!(relevant_externals(&network, &functions, &stable(&[(0, true)])), vec![0]);
    assert_eq!(relevant_externals(&network, &functions, &stable(&[(1, true)])), vec![0]);
    assert!(relevant_externals(&network, &functions, &BTreeMap::new()).is_empty());
}

#[test]
fn stability_under_external_rows() {
    init_logger();
    let (network, functions) = prepare();
    let a_true = stable(&[(0, true)]);
    assert!(is_stable_under(&network, &functions, &a_true, &[Some(false)]));
    assert!(is_stable_under(&network, &functions, &a_true, &[Some(true)]));

    let a_false = stable(&[(0, false)]);
    assert!(is_stable_under(&network, &functions, &a_false, &[Some(false)]));
    assert!(!is_stable_under(&network, &functions, &a_false, &[Some(true)]));
    // An unknown external may switch `A` on.
    assert!(!is_stable_under(&network, &functions, &a_false, &[None]));
}

#[test]
fn external_rows_are_exhaustive() -> Result<(), TrapSpaceError> {
    init_logger();
    let (network, functions) = prepare();
    let config = ExternalsConfig::default();

    let rows = external_rows(&network, &functions, &stable(&[(0, true)]), &[Some(true)], &config)?;
    assert_eq!(rows, vec![vec![Some(false)], vec![Some(true)]]);

    let both = stable(&[(0, true), (1, true)]);
    let rows = external_rows(&network, &functions, &both, &[Some(true)], &config)?;
    assert_eq!(rows, vec![vec![Some(true)]]);

    let rows = external_rows(&network, &functions, &BTreeMap::new(), &[None], &config)?;
    assert_eq!(rows, vec![vec![None]]);
    Ok(())
}

#[test]
fn too_many_externals_use_the_enumerated_row() -> Result<(), TrapSpaceError> {
    init_logger();
    let (network, functions) = prepare();
    let config = ExternalsConfig {
        max_enumerated_inputs: 0,
    };
    let rows = external_rows(&network, &functions, &stable(&[(0, true)]), &[Some(true)], &config)?;
    assert_eq!(rows, vec![vec![Some(true)]]);
    Ok(())
}

#[test]
fn resolved_rows_are_trap_spaces() -> Result<(), TrapSpaceError> {
    init_logger();
    let (network, functions) = prepare();
    let config = EnumerationConfig::new(network.clone())?;
    let candidates = enumerate_trap_spaces(config)?;
    let count = candidates.len();
    let store = resolve_externals(&network, &functions, candidates, &ExternalsConfig::default())?;
    assert_eq!(store.len(), count);

    let oracle = TrapSpaceOracle::new(&network);
    for space in store.solutions() {
        let rows = store.rows_of(space.id);
        assert!(!rows.is_empty());
        for row in rows {
            assert!(oracle.is_trap_space(&space.stable, row), "{space:?} / {row:?}");
        }
    }
    Ok(())
}

#[test]
fn identical_row_sets_are_shared() -> Result<(), TrapSpaceError> {
    init_logger();
    let (network, functions) = prepare();
    let candidates = vec![
        TrapSpaceCandidate {
            stable: stable(&[(0, false)]),
            externals: vec![Some(false)],
        },
        TrapSpaceCandidate {
            stable: stable(&[(0, false), (1, false)]),
            externals: vec![Some(false)],
        },
        TrapSpaceCandidate {
            stable: stable(&[(0, true)]),
            externals: vec![Some(true)],
        },
    ];
    let store = resolve_externals(&network, &functions, candidates, &ExternalsConfig::default())?;
    assert_eq!(store.len(), 3);
    assert_eq!(store.external_of(0), store.external_of(1));
    assert_ne!(store.external_of(0), store.external_of(2));
    assert_eq!(store.rows_of(0), &[vec![Some(false)]]);
    Ok(())
}

#[test]
fn restoration_extends_or_splits() -> Result<(), TrapSpaceError> {
    init_logger();
    let (network, _) = prepare();
    let d = network.id_of("D").unwrap();

    let mut store = SolutionStore::new();
    let split = store.add_solution(stable(&[(0, true)]));
    let both_rows = store.add_external_set(vec![vec![Some(false)], vec![Some(true)]]);
    store.link(split, both_rows)?;

    let extended = store.add_solution(stable(&[(0, true), (1, true)]));
    let true_row = store.add_external_set(vec![vec![Some(true)]]);
    store.link(extended, true_row)?;

    let unknown = store.add_solution(BTreeMap::new());
    let none_row = store.add_external_set(vec![vec![None]]);
    store.link(unknown, none_row)?;

    restore_removed_variables(&network, &mut store)?;

    // The first trap space is replaced by one trap space per value of `D`.
    assert!(store.solution(split).is_none());
    assert_eq!(store.len(), 4);
    let restored = store
        .solutions()
        .filter(|it| it.stable.len() == 2 && it.stable.get(&0) == Some(&true) && it.stable.contains_key(&d))
        .map(|it| (it.stable[&d], store.rows_of(it.id).to_vec()))
        .collect::<Vec<_>>();
    assert_eq!(restored.len(), 2);
    for (value, rows) in restored {
        assert_eq!(rows, vec![vec![Some(value)]]);
    }
    // Split rows get their own sets, even where they equal the rows of another trap space.
    let split_sets = store
        .solutions()
        .filter(|it| it.id != extended && it.stable.contains_key(&d))
        .map(|it| store.external_of(it.id))
        .collect::<Vec<_>>();
    assert_eq!(split_sets.len(), 2);
    assert!(!split_sets.contains(&Some(true_row)));

    let extended = store.solution(extended).unwrap();
    assert_eq!(extended.stable, stable(&[(0, true), (1, true), (d, true)]));
    assert_eq!(store.solution(unknown).unwrap().stable, BTreeMap::new());

    // The set with both rows is no longer referenced.
    assert!(store.external_rows(both_rows).is_none());
    Ok(())
}

#[test]
fn restoration_without_removed_variables_is_a_no_op() -> Result<(), TrapSpaceError> {
    init_logger();
    let network = prepare_network("A*=~B\nB*=~A\n", &ReductionConfig::default());
    let mut store = SolutionStore::new();
    let id = store.add_solution(stable(&[(0, true), (1, false)]));
    let rows = store.add_external_set(vec![vec![]]);
    store.link(id, rows)?;
    restore_removed_variables(&network, &mut store)?;
    assert_eq!(store.solution(id).unwrap().stable.len(), 2);
    Ok(())
}
