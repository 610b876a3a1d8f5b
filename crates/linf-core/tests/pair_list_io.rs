//! File-level tests for the image pair list format.

use linf_core::pairs::{load_pairs, save_pairs, PairListError, PairListOptions};
use linf_core::PairSet;
use std::fs;
use tempfile::NamedTempFile;

#[test]
fn save_then_load_round_trips() {
    let pairs: PairSet = [(0, 1), (0, 7), (2, 3), (10, 42), (3, 99)]
        .into_iter()
        .collect();
    let file = NamedTempFile::new().unwrap();
    save_pairs(file.path(), &pairs).unwrap();

    let mut loaded = PairSet::new();
    let added = load_pairs(file.path(), &PairListOptions::default(), &mut loaded).unwrap();

    assert_eq!(added, pairs.len());
    assert_eq!(loaded, pairs);
}

#[test]
fn saved_file_has_one_record_per_line() {
    let pairs: PairSet = [(4, 5), (1, 9)].into_iter().collect();
    let file = NamedTempFile::new().unwrap();
    save_pairs(file.path(), &pairs).unwrap();
    assert_eq!(fs::read_to_string(file.path()).unwrap(), "1 9\n4 5\n");
}

#[test]
fn self_pair_line_fails_the_load() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "0 1 2\n3 3\n").unwrap();

    let mut pairs = PairSet::new();
    let err = load_pairs(file.path(), &PairListOptions::default(), &mut pairs).unwrap_err();
    assert!(matches!(err, PairListError::SelfPair { index: 3, .. }));
    assert!(pairs.is_empty());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let mut pairs = PairSet::new();
    let err = load_pairs(&path, &PairListOptions::default(), &mut pairs).unwrap_err();
    match err {
        PairListError::File { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tabs_and_repeated_spaces_are_collapsed() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), "  5 \t 1   3\t\n").unwrap();
    let mut pairs = PairSet::new();
    load_pairs(file.path(), &PairListOptions::default(), &mut pairs).unwrap();
    let expected: PairSet = [(1, 5), (3, 5)].into_iter().collect();
    assert_eq!(pairs, expected);
}
