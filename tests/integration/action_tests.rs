use dupsweep::actions::{apply, Action, ActionContext, ActionError, ActionOutcome, RemovalMode};
use dupsweep::duplicates::{DuplicateDetector, DuplicateSet};
use dupsweep::scanner::Walker;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn detect(root: &Path) -> DuplicateSet {
    let (files, _) = Walker::new(root).collect_files().unwrap();
    DuplicateDetector::with_defaults().detect(&files).unwrap().0
}

/// Three groups of different sizes plus unique files, spread over subfolders.
fn populate(root: &Path) {
    fs::create_dir_all(root.join("sub1")).unwrap();
    fs::create_dir_all(root.join("sub2")).unwrap();

    fs::write(root.join("a1.txt"), "alpha").unwrap();
    fs::write(root.join("sub1").join("a2.txt"), "alpha").unwrap();
    fs::write(root.join("sub2").join("a3.txt"), "alpha").unwrap();

    fs::write(root.join("b1.bin"), vec![9u8; 10_000]).unwrap();
    fs::write(root.join("sub2").join("b2.bin"), vec![9u8; 10_000]).unwrap();

    fs::write(root.join("u1.txt"), "unique one").unwrap();
    fs::write(root.join("sub1").join("u2.txt"), "unique two").unwrap();
}

#[test]
fn test_delete_keeps_exactly_the_first_of_each_group() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let set = detect(dir.path());
    assert_eq!(set.len(), 2);

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(dir.path(), &mut sink).with_removal(RemovalMode::Permanent);
    let outcome = apply(Action::Delete, &set, &mut ctx).unwrap();

    for group in &set {
        let surviving: Vec<&PathBuf> = group.files.iter().filter(|p| p.exists()).collect();
        assert_eq!(surviving, vec![&group.files[0]]);
    }
    assert!(dir.path().join("u1.txt").exists());
    assert!(dir.path().join("sub1").join("u2.txt").exists());

    let batch = outcome.batch().unwrap();
    assert_eq!(batch.processed_count(), 3);
    assert_eq!(batch.bytes, 5 * 2 + 10_000);

    // Nothing left to find afterwards.
    assert!(detect(dir.path()).is_empty());
}

#[test]
fn test_move_relocates_every_member() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let set = detect(dir.path());

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(dir.path(), &mut sink).with_move_folder(Some("moved".into()));
    let outcome = apply(Action::Move, &set, &mut ctx).unwrap();

    let ActionOutcome::Moved { destination, batch } = outcome else {
        panic!("expected a move outcome");
    };
    assert_eq!(destination, dir.path().join("moved"));
    assert!(batch.all_succeeded());
    assert_eq!(batch.processed_count(), set.file_count());

    for group in &set {
        let group_dir = destination.join(group.hash_hex());
        for path in &group.files {
            assert!(!path.exists(), "{} left behind", path.display());
            assert!(group_dir.join(path.file_name().unwrap()).is_file());
        }
        assert_eq!(fs::read_dir(&group_dir).unwrap().count(), group.len());
    }

    let moved: Vec<_> = batch
        .processed
        .iter()
        .map(|p| p.destination.clone().unwrap())
        .collect();
    assert!(moved.iter().all(|p| p.starts_with(&destination)));
}

#[test]
fn test_move_collision_leaves_second_file_in_place() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("x")).unwrap();
    fs::create_dir(dir.path().join("y")).unwrap();
    fs::write(dir.path().join("x").join("photo.jpg"), "pixels").unwrap();
    fs::write(dir.path().join("y").join("photo.jpg"), "pixels").unwrap();
    let set = detect(dir.path());

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(dir.path(), &mut sink).with_move_folder(Some("m".into()));
    let outcome = apply(Action::Move, &set, &mut ctx).unwrap();
    let batch = outcome.batch().unwrap();

    assert_eq!(batch.processed_count(), 1);
    assert_eq!(batch.failure_count(), 1);
    assert!(!dir.path().join("x").join("photo.jpg").exists());
    assert!(dir.path().join("y").join("photo.jpg").exists());
}

#[test]
fn test_move_destination_exists() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let set = detect(dir.path());
    fs::write(dir.path().join("taken"), "not a folder").unwrap();

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(dir.path(), &mut sink).with_move_folder(Some("taken".into()));
    let err = apply(Action::Move, &set, &mut ctx).unwrap_err();

    assert!(matches!(err, ActionError::DestinationExists(_)));
    assert!(dir.path().join("a1.txt").exists());
}

#[test]
fn test_delete_reports_already_gone_files() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let set = detect(dir.path());

    fs::remove_file(dir.path().join("sub2").join("b2.bin")).unwrap();

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(dir.path(), &mut sink);
    let outcome = apply(Action::Delete, &set, &mut ctx).unwrap();
    let batch = outcome.batch().unwrap();

    assert_eq!(batch.missing, vec![dir.path().join("sub2").join("b2.bin")]);
    assert_eq!(batch.processed_count(), 2);
    assert!(batch.all_succeeded());
    assert!(outcome.summary().contains("1 already gone"));
}

#[test]
fn test_report_overwrites_previous_report() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    populate(&root);
    let set = detect(&root);
    let report = dir.path().join("results.txt");
    fs::write(&report, "old\nold\nold\nold\nold\nold\nold\nold\nold\nold\n").unwrap();

    let mut sink = io::sink();
    let mut ctx = ActionContext::new(&root, &mut sink).with_report_path(report.clone());
    let outcome = apply(Action::Report, &set, &mut ctx).unwrap();

    match outcome {
        ActionOutcome::Reported { path, groups } => {
            assert_eq!(path, report);
            assert_eq!(groups, 2);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let content = fs::read_to_string(&report).unwrap();
    assert!(!content.contains("old"));
    let headers = content.lines().filter(|l| l.ends_with(':')).count();
    let members = content.lines().filter(|l| l.starts_with('\t')).count();
    assert_eq!(headers, 2);
    assert_eq!(members, set.file_count());
}

#[test]
fn test_list_matches_report_format() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    populate(&root);
    let set = detect(&root);
    let report = dir.path().join("r.txt");

    let mut listed = Vec::new();
    let mut ctx = ActionContext::new(&root, &mut listed).with_report_path(report.clone());
    apply(Action::List, &set, &mut ctx).unwrap();
    apply(Action::Report, &set, &mut ctx).unwrap();
    drop(ctx);

    assert_eq!(String::from_utf8(listed).unwrap(), fs::read_to_string(&report).unwrap());
}
