use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;

fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git runs");
    assert!(status.success(), "git {args:?} failed");
}

fn setup_repo() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let root = dir.path();
    git(root, &["init", "-q", "-b", "main"]);
    git(root, &["config", "user.name", "Test"]);
    git(root, &["config", "user.email", "test@example.com"]);

    let pkg = root.join("packages/pkg-a");
    std::fs::create_dir_all(&pkg).expect("create package dir");
    std::fs::write(
        pkg.join("package.json"),
        "{\n  \"name\": \"pkg-a\",\n  \"version\": \"1.0.0\"\n}\n",
    )
    .expect("write manifest");
    git(root, &["add", "-A"]);
    git(root, &["commit", "-q", "-m", "initial"]);
    dir
}

#[test]
fn help_lists_all_subcommands() {
    Command::cargo_bin("ripple")
        .expect("binary built")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("change")
                .and(predicate::str::contains("check"))
                .and(predicate::str::contains("bump"))
                .and(predicate::str::contains("publish"))
                .and(predicate::str::contains("sync")),
        );
}

#[test]
fn change_creates_a_record_file() {
    let repo = setup_repo();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "change",
            "pkg-a",
            "--type",
            "minor",
            "-m",
            "add a feature",
            "--no-prompt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("created .ripple/"));

    let records: Vec<_> = std::fs::read_dir(repo.path().join(".ripple"))
        .expect("records dir")
        .collect();
    assert_eq!(records.len(), 1);
}

#[test]
fn change_for_unknown_package_fails() {
    let repo = setup_repo();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "change",
            "ghost",
            "--type",
            "patch",
            "-m",
            "x",
            "--no-prompt",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown package 'ghost'"));
}

#[test]
fn bump_dry_run_reports_without_writing() {
    let repo = setup_repo();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "change",
            "pkg-a",
            "--type",
            "minor",
            "-m",
            "add a feature",
            "--no-prompt",
        ])
        .assert()
        .success();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "bump",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("would bump pkg-a: 1.0.0 -> 1.1.0"));

    let manifest =
        std::fs::read_to_string(repo.path().join("packages/pkg-a/package.json")).expect("read");
    assert!(manifest.contains("\"1.0.0\""));
}

#[test]
fn bump_applies_and_consumes_the_record() {
    let repo = setup_repo();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "change",
            "pkg-a",
            "--type",
            "patch",
            "-m",
            "fix a bug",
            "--no-prompt",
        ])
        .assert()
        .success();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args(["-C", repo.path().to_str().expect("utf8 path"), "bump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bumped pkg-a: 1.0.0 -> 1.0.1"));

    let manifest =
        std::fs::read_to_string(repo.path().join("packages/pkg-a/package.json")).expect("read");
    assert!(manifest.contains("\"1.0.1\""));
    let records: Vec<_> = std::fs::read_dir(repo.path().join(".ripple"))
        .expect("records dir")
        .collect();
    assert!(records.is_empty(), "record consumed by the bump");
    assert!(repo.path().join("packages/pkg-a/CHANGELOG.json").exists());
}

#[test]
fn check_fails_without_a_comparison_branch() {
    let repo = setup_repo();

    Command::cargo_bin("ripple")
        .expect("binary built")
        .args([
            "-C",
            repo.path().to_str().expect("utf8 path"),
            "check",
            "--no-fetch",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("origin/main"));
}
