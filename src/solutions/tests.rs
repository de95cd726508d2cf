use crate::solutions::{SolutionStore, StoreError, expand_row, rows_compatible};
use std::collections::{BTreeMap, BTreeSet};

fn stable(values: &[(usize, bool)]) -> BTreeMap<usize, bool> {
    values.iter().copied().collect()
}

#[test]
fn ids_are_never_reused() {
    let mut store = SolutionStore::new();
    let a = store.add_solution(stable(&[(0, true)]));
    let b = store.add_solution(stable(&[(0, false)]));
    assert_ne!(a, b);
    assert!(store.remove_solution(a).is_some());
    let c = store.add_solution(stable(&[(0, true)]));
    assert!(c > b);
    assert_eq!(store.len(), 2);
}

#[test]
fn identical_external_sets_share_id() {
    let mut store = SolutionStore::new();
    let first = store.add_external_set(vec![vec![Some(true), None], vec![Some(false), None]]);
    let second = store.add_external_set(vec![vec![Some(false), None], vec![Some(true), None]]);
    let third = store.add_external_set(vec![vec![None, None]]);
    assert_eq!(first, second);
    assert_ne!(first, third);
    assert_eq!(store.not_null_externals(first), BTreeSet::from([0]));
    assert!(store.not_null_externals(third).is_empty());
}

#[test]
fn external_sets_in_use_cannot_be_removed() {
    let mut store = SolutionStore::new();
    let solution = store.add_solution(stable(&[(1, true)]));
    let external = store.add_external_set(vec![vec![Some(true)]]);
    store.link(solution, external).unwrap();
    assert_eq!(store.rows_of(solution), &[vec![Some(true)]]);
    assert_eq!(
        store.remove_external(external),
        Err(StoreError::ExternalSetInUse {
            external,
            solution
        })
    );
    assert_eq!(store.link(99, external), Err(StoreError::UnknownSolution(99)));
    assert_eq!(store.link(solution, 99), Err(StoreError::UnknownExternalSet(99)));

    store.remove_solution(solution);
    assert_eq!(store.remove_unused_externals(), Ok(1));
    assert!(store.external_rows(external).is_none());
    assert_eq!(store.remove_unused_externals(), Ok(0));
}

#[test]
fn fresh_external_sets_are_never_shared() {
    let mut store = SolutionStore::new();
    let rows = vec![vec![Some(true)], vec![Some(false)]];
    let shared = store.add_external_set(rows.clone());
    let fresh = store.add_fresh_external_set(rows.clone());
    assert_ne!(shared, fresh);
    assert_eq!(store.external_rows(fresh), store.external_rows(shared));
    assert_eq!(store.add_external_set(rows.clone()), shared);

    // Dropping the fresh set keeps the shared one registered.
    let solution = store.add_solution(stable(&[]));
    store.link(solution, shared).unwrap();
    assert_eq!(store.remove_unused_externals(), Ok(1));
    assert!(store.external_rows(fresh).is_none());
    assert_eq!(store.add_external_set(rows), shared);
}

#[test]
fn removal_cleans_inclusions() {
    let mut store = SolutionStore::new();
    let small = store.add_solution(stable(&[]));
    let large_a = store.add_solution(stable(&[(0, true)]));
    let large_b = store.add_solution(stable(&[(0, false)]));
    store.set_inclusions(small, BTreeSet::from([large_a, large_b]));
    store.remove_solution(large_a);
    assert_eq!(store.inclusions(small), Some(&BTreeSet::from([large_b])));

    store.mark_included(small).unwrap();
    assert_eq!(store.remove_included(), 1);
    assert!(store.inclusions(small).is_none());
    assert_eq!(store.solution_ids(), vec![large_b]);
}

#[test]
fn row_helpers() {
    assert!(rows_compatible(&[Some(true), None], &[Some(true), Some(false)]));
    assert!(!rows_compatible(&[Some(true), None], &[Some(false), None]));
    let expanded = expand_row(&[None, Some(true), None], &[0, 1]);
    assert_eq!(
        expanded,
        vec![
            vec![Some(false), Some(true), None],
            vec![Some(true), Some(true), None],
        ]
    );
}
