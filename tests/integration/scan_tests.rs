use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::error::ExitCode;
use dupsweep::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupsweep", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn hello_world(root: &Path) {
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("b.txt"), "hello").unwrap();
    fs::write(root.join("c.txt"), "world").unwrap();
}

#[test]
fn test_list_completes() {
    let dir = tempdir().unwrap();
    hello_world(dir.path());

    let code = run(&["list", path_arg(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_file_action_writes_report() {
    let dir = tempdir().unwrap();
    let scanned = dir.path().join("scanned");
    fs::create_dir(&scanned).unwrap();
    hello_world(&scanned);
    let report = dir.path().join("report.txt");

    let code = run(&[
        "--report-file",
        path_arg(&report),
        "file",
        path_arg(&scanned),
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let content = fs::read_to_string(&report).unwrap();
    let expected = format!(
        "5d41402abc4b2a76b9719d911017c592:\n\t{}\n\t{}\n",
        scanned.join("a.txt").display(),
        scanned.join("b.txt").display()
    );
    assert_eq!(content, expected);
}

#[test]
fn test_delete_action_keeps_first() {
    let dir = tempdir().unwrap();
    hello_world(dir.path());

    run(&["delete", path_arg(dir.path())]).unwrap();

    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_move_action_layout() {
    let dir = tempdir().unwrap();
    hello_world(dir.path());

    run(&["--move-folder", "dupes", "move", path_arg(dir.path())]).unwrap();

    let group_dir = dir
        .path()
        .join("dupes")
        .join("5d41402abc4b2a76b9719d911017c592");
    assert_eq!(fs::read_to_string(group_dir.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(group_dir.join("b.txt")).unwrap(), "hello");
    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(dir.path().join("c.txt").exists());
}

#[test]
fn test_move_into_existing_folder_is_fatal() {
    let dir = tempdir().unwrap();
    hello_world(dir.path());
    fs::create_dir(dir.path().join("dupes")).unwrap();

    let err = run(&["--move-folder", "dupes", "move", path_arg(dir.path())]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_empty_root_exits_cleanly() {
    let dir = tempdir().unwrap();

    let code = run(&["delete", path_arg(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_move_without_duplicates_creates_empty_destination() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "1").unwrap();
    fs::write(dir.path().join("b"), "2").unwrap();

    let code = run(&["--move-folder", "dupes", "move", path_arg(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let destination = dir.path().join("dupes");
    assert!(destination.is_dir());
    assert_eq!(fs::read_dir(&destination).unwrap().count(), 0);
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[test]
fn test_file_without_duplicates_clears_stale_report() {
    let dir = tempdir().unwrap();
    let scanned = dir.path().join("scanned");
    fs::create_dir(&scanned).unwrap();
    fs::write(scanned.join("a"), "1").unwrap();
    fs::write(scanned.join("b"), "2").unwrap();
    let report = dir.path().join("results.txt");
    fs::write(&report, "deadbeef:\n\t/old/dup\n").unwrap();

    let code = run(&[
        "--report-file",
        path_arg(&report),
        "file",
        path_arg(&scanned),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_to_string(&report).unwrap(), "");
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = run(&["list", path_arg(&missing)]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    assert!(run(&["list", path_arg(&file)]).is_err());
}

#[test]
fn test_blake3_algorithm_groups_the_same_files() {
    let dir = tempdir().unwrap();
    hello_world(dir.path());
    let report = dir.path().join("out").join("r.txt");
    fs::create_dir(dir.path().join("out")).unwrap();

    run(&[
        "--algorithm",
        "blake3",
        "--report-file",
        path_arg(&report),
        "file",
        path_arg(dir.path()),
    ])
    .unwrap();

    let content = fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].len(), 33);
    assert_ne!(lines[0], "5d41402abc4b2a76b9719d911017c592:");
}
