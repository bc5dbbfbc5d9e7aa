use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn treescan() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("treescan").unwrap()
}

fn setup_small_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b").join("c.txt"), "c").unwrap();
    dir
}

#[test]
fn count_prints_per_kind_totals() {
    let dir = setup_small_tree();

    treescan()
        .arg("count")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("Regular files: 2\nDirectories: 2\nTotal: 4\n");
}

#[test]
fn list_prints_indicator_and_path() {
    let dir = setup_small_tree();

    let output = treescan()
        .args(["list", "--concurrency", "1"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);

    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    let mut expected = vec![
        format!("d {}", dir.path().display()),
        format!("d {}", dir.path().join("b").display()),
        format!("- {}", dir.path().join("a.txt").display()),
        format!("- {}", dir.path().join("b").join("c.txt").display()),
    ];
    expected.sort_unstable();
    assert_eq!(lines, expected);
}

#[test]
fn missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    treescan()
        .arg("count")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn file_root_fails() {
    let dir = setup_small_tree();

    treescan()
        .arg("list")
        .arg(dir.path().join("a.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn zero_concurrency_is_rejected() {
    let dir = setup_small_tree();

    treescan()
        .args(["count", "-c", "0"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn help_lists_subcommands() {
    treescan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("count").and(predicate::str::contains("list")));
}

#[cfg(unix)]
#[test]
fn scan_errors_set_the_exit_status_unless_suppressed() {
    use std::os::unix::fs::PermissionsExt;

    let dir = setup_small_tree();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through mode bits; nothing to check then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    treescan()
        .arg("count")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Directories: 3"))
        .stderr(
            predicate::str::contains("error: permission denied")
                .and(predicate::str::contains("directory scan failed")),
        );

    treescan()
        .args(["count", "--suppress-errors"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(
            predicate::str::contains("permission denied")
                .not()
                .and(predicate::str::contains("directory scan failed").not()),
        );

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}
