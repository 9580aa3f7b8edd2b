use dupsweep::actions::{delete_duplicates, move_duplicates, RemovalMode};
use dupsweep::duplicates::{
    DetectError, DetectorConfig, DuplicateDetector, DuplicateGroup, DuplicateSet, ReadErrorPolicy,
};
use dupsweep::scanner::{Digest, HashError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_abort_reports_first_failure_in_input_order() {
    let dir = tempdir().unwrap();
    let ok = dir.path().join("ok.txt");
    fs::write(&ok, "data").unwrap();
    let missing_1 = dir.path().join("nonexistent_1.txt");
    let missing_2 = dir.path().join("nonexistent_2.txt");

    let config = DetectorConfig::default().with_io_threads(4);
    let result = DuplicateDetector::new(config).detect(&[ok, missing_1.clone(), missing_2]);

    match result {
        Err(DetectError::Hash(HashError::NotFound(path))) => assert_eq!(path, missing_1),
        other => panic!("Expected NotFound for the first missing file, got: {other:?}"),
    }
}

#[test]
fn test_skip_continues_and_records_errors() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();
    let files = vec![
        PathBuf::from("nonexistent_1.txt"),
        a.clone(),
        PathBuf::from("nonexistent_2.txt"),
        b.clone(),
    ];

    let config = DetectorConfig::default().with_read_errors(ReadErrorPolicy::Skip);
    let (set, stats) = DuplicateDetector::new(config).detect(&files).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.groups()[0].files, vec![a, b]);
    assert_eq!(stats.skipped.len(), 2);
    for err in &stats.skipped {
        assert!(matches!(err, HashError::NotFound(_)), "unexpected {err:?}");
    }
}

#[test]
fn test_skip_file_vanishing_between_phases() {
    let dir = tempdir().unwrap();
    let files: Vec<PathBuf> = (0..3)
        .map(|i| {
            let p = dir.path().join(format!("f{i}"));
            fs::write(&p, "twin").unwrap();
            p
        })
        .collect();

    // Only the files still present are considered; a missing one never joins a group.
    fs::remove_file(&files[1]).unwrap();
    let config = DetectorConfig::default().with_read_errors(ReadErrorPolicy::Skip);
    let (set, stats) = DuplicateDetector::new(config).detect(&files).unwrap();

    assert_eq!(set.groups()[0].files, vec![files[0].clone(), files[2].clone()]);
    assert_eq!(stats.skipped.len(), 1);
}

#[test]
fn test_delete_continues_after_failures() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let blocked = dir.path().join("blocked");
    let dup = dir.path().join("dup");
    fs::write(&keep, "x").unwrap();
    fs::write(&dup, "x").unwrap();
    // A directory cannot be removed with remove_file.
    fs::create_dir(&blocked).unwrap();

    let set: DuplicateSet = vec![DuplicateGroup::new(
        Digest::from_bytes([5; 16]),
        vec![keep.clone(), blocked.clone(), dup.clone()],
    )]
    .into_iter()
    .collect();

    let batch = delete_duplicates(&set, RemovalMode::Permanent, None);

    assert_eq!(batch.failure_count(), 1);
    assert_eq!(batch.failures[0].0, blocked);
    assert_eq!(batch.processed_count(), 1);
    assert!(keep.exists());
    assert!(!dup.exists());
}

#[test]
fn test_move_group_folder_failure_spares_other_groups() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("dest");
    fs::create_dir(&destination).unwrap();

    let bad_digest = Digest::from_bytes([1; 16]);
    let good_digest = Digest::from_bytes([2; 16]);
    // A plain file where the first group's folder should go.
    fs::write(destination.join(bad_digest.to_hex()), "in the way").unwrap();

    let make = |name: &str| {
        let p = dir.path().join(name);
        fs::write(&p, name).unwrap();
        p
    };
    let bad = vec![make("b1"), make("b2")];
    let good = vec![make("g1"), make("g2")];

    let set: DuplicateSet = vec![
        DuplicateGroup::new(bad_digest, bad.clone()),
        DuplicateGroup::new(good_digest, good.clone()),
    ]
    .into_iter()
    .collect();

    let batch = move_duplicates(&set, &destination, None);

    assert_eq!(batch.failure_count(), 2);
    assert!(bad.iter().all(|p| p.exists()));
    assert_eq!(batch.processed_count(), 2);
    assert!(good.iter().all(|p| !p.exists()));
    assert!(destination.join(good_digest.to_hex()).join("g1").exists());
}
