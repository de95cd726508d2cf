use crate::hierarchy::{build_hierarchy, compatible_rows};
use crate::solutions::{ExternalRow, SolutionStore};
use crate::test_utils::init_logger;
use cancel_this::Cancellable;
use std::collections::{BTreeMap, BTreeSet};

fn stable(values: &[(usize, bool)]) -> BTreeMap<usize, bool> {
    values.iter().copied().collect()
}

fn add(store: &mut SolutionStore, values: &[(usize, bool)], rows: Vec<ExternalRow>) -> usize {
    let id = store.add_solution(stable(values));
    let external = store.add_external_set(rows);
    store.link(id, external).unwrap();
    id
}

#[test]
fn equal_sizes_are_never_included() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    let ones = add(&mut store, &[(0, true), (1, true), (2, true)], vec![vec![]]);
    let zeros = add(&mut store, &[(0, false), (1, false), (2, false)], vec![vec![]]);
    let empty = add(&mut store, &[], vec![vec![]]);

    let edges = build_hierarchy(&mut store)?;
    assert_eq!(edges, 2);
    assert_eq!(store.inclusions(empty), Some(&BTreeSet::from([ones, zeros])));
    assert!(store.inclusions(ones).is_none());
    assert!(store.inclusions(zeros).is_none());
    Ok(())
}

#[test]
fn disagreeing_values_are_never_included() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    let small = add(&mut store, &[(0, true)], vec![vec![]]);
    let agrees = add(&mut store, &[(0, true), (1, false)], vec![vec![]]);
    let _disagrees = add(&mut store, &[(0, false), (1, false)], vec![vec![]]);
    let _unrelated = add(&mut store, &[(1, true)], vec![vec![]]);

    build_hierarchy(&mut store)?;
    assert_eq!(store.inclusions(small), Some(&BTreeSet::from([agrees])));
    assert_eq!(store.included_solutions(), vec![small]);
    Ok(())
}

#[test]
fn external_rows_must_be_compatible() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    // The smaller trap space does not care about the first external.
    let small = add(&mut store, &[(0, true)], vec![vec![None, Some(true)]]);
    let compatible = add(&mut store, &[(0, true), (1, true)], vec![vec![Some(false), Some(true)]]);
    let incompatible = add(
        &mut store,
        &[(0, true), (1, false)],
        vec![vec![Some(true), Some(false)]],
    );

    build_hierarchy(&mut store)?;
    assert_eq!(store.inclusions(small), Some(&BTreeSet::from([compatible])));

    let small_ext = store.external_of(small).unwrap();
    let compatible_ext = store.external_of(compatible).unwrap();
    let incompatible_ext = store.external_of(incompatible).unwrap();
    assert_eq!(
        store.compatible_externals(small_ext, compatible_ext),
        Some(&[vec![Some(false), Some(true)]][..])
    );
    assert_eq!(
        store.compatible_externals(small_ext, incompatible_ext),
        Some(&[][..])
    );
    Ok(())
}

#[test]
fn compatible_rows_expand_unspecified_positions() {
    init_logger();
    let mut store = SolutionStore::new();
    let smaller = store.add_external_set(vec![vec![None, None, Some(false)]]);
    let larger = store.add_external_set(vec![
        vec![Some(true), None, None],
        vec![Some(false), Some(true), None],
    ]);
    let rows = compatible_rows(&store, smaller, larger);
    assert_eq!(
        rows,
        vec![
            vec![Some(false), Some(true), Some(false)],
            vec![Some(true), Some(false), Some(false)],
            vec![Some(true), Some(true), Some(false)],
        ]
    );
}

#[test]
fn hierarchy_is_rebuilt_from_scratch() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    let small = add(&mut store, &[], vec![vec![]]);
    let large = add(&mut store, &[(0, true)], vec![vec![]]);
    build_hierarchy(&mut store)?;
    assert_eq!(store.inclusions(small), Some(&BTreeSet::from([large])));

    store.remove_solution(large);
    assert_eq!(build_hierarchy(&mut store)?, 0);
    assert!(store.included_solutions().is_empty());
    Ok(())
}

#[test]
fn split_rows_are_compared_by_content() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    let rows = vec![vec![Some(true), None]];
    let large = add(&mut store, &[(0, true)], rows.clone());
    let shared = store.external_of(large).unwrap();

    // The rows split off a smaller trap space happen to equal the rows of `large`.
    let copy = store.add_solution(stable(&[]));
    let fresh = store.add_fresh_external_set(rows.clone());
    store.link(copy, fresh).unwrap();
    assert_ne!(fresh, shared);

    build_hierarchy(&mut store)?;
    assert_eq!(store.inclusions(copy), Some(&BTreeSet::from([large])));
    assert_eq!(store.compatible_externals(fresh, shared), Some(&rows[..]));
    Ok(())
}

#[test]
fn empty_external_sets_are_never_compatible() -> Cancellable<()> {
    init_logger();
    let mut store = SolutionStore::new();
    let small = add(&mut store, &[], vec![]);
    let large = add(&mut store, &[(0, true)], vec![]);
    assert_eq!(store.external_of(small), store.external_of(large));
    assert_eq!(build_hierarchy(&mut store)?, 0);
    Ok(())
}
