//! Integration tests for the CLI argument surface.
//!
//! These exercise `clap`'s generated behavior: help text, version output,
//! required arguments and flag conflicts. None of them touch the registry
//! or the filesystem beyond a scratch directory.

use assert_cmd::Command;
use predicates::prelude::*;

/// Top-level help names the tool's purpose and both subcommands.
#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scaffold TypeScript Express APIs"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"));
}

/// `--version` reports the crate version.
#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Running without a subcommand prints usage and fails.
#[test]
fn test_no_subcommand_shows_usage() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

/// `add` requires a module name.
#[test]
fn test_add_requires_module_argument() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.arg("add").assert().failure().stderr(predicate::str::contains("Usage"));
}

/// Unknown subcommands are rejected by the parser.
#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.arg("upgrade")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

/// `--verbose` and `--quiet` are mutually exclusive.
#[test]
fn test_verbose_conflicts_with_quiet() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.args(["--verbose", "--quiet", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

/// Help for `add` documents the module argument.
#[test]
fn test_add_help_documents_module() {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MODULE"))
        .stdout(predicate::str::contains("registry"));
}
