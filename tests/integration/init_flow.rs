//! Integration tests for project initialization.
//!
//! Fresh initialization is prompt-driven, so end-to-end coverage here
//! focuses on the non-interactive behaviors: cancelling cleanly without a
//! terminal, and adopting an existing project, which must only ever touch
//! safe files. Tests that spawn the binary while a fixture server is
//! running use a multi-threaded runtime: the child process blocks one
//! worker while the registry fixture answers on another.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use zuro_cli::test_utils::fixtures::LEGACY_PACKAGE_JSON;
use zuro_cli::test_utils::{ProjectFixture, RegistryFixture, standard_registry};

/// Without a terminal the project name prompt is dismissed and nothing is
/// written.
#[test]
fn test_fresh_init_without_terminal_cancels_cleanly() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        // Unroutable on purpose: this flow must not contact the registry.
        .env("ZURO_REGISTRY_URL", "http://127.0.0.1:9/registry")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

/// Adopting an existing project writes config and safe utility files but
/// never entrypoints, and preserves the hand-written package manifest.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_existing_project_adoption_writes_safe_files_only() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::bare_node_project().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", &installed.entry_url)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Existing project detected"));

    assert!(temp.path().join("zuro.json").exists());
    assert!(temp.path().join("src/env.ts").exists());
    assert_eq!(
        std::fs::read_to_string(temp.path().join(".env")).unwrap(),
        "# Environment Variables\nPORT=3000\nNODE_ENV=development\n"
    );

    assert!(!temp.path().join("src/app.ts").exists());
    assert!(!temp.path().join("src/server.ts").exists());
    assert!(!temp.path().join("src/routes/index.ts").exists());

    let package = std::fs::read_to_string(temp.path().join("package.json")).unwrap();
    assert_eq!(package, LEGACY_PACKAGE_JSON);
}

/// The adopted project's package manager is detected from its lockfile.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_existing_project_detects_lockfile_package_manager() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::bare_node_project().file("pnpm-lock.yaml", "lockfileVersion: 9\n").write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", &installed.entry_url)
        .arg("init")
        .assert()
        .success();

    let config = std::fs::read_to_string(temp.path().join("zuro.json")).unwrap();
    assert!(config.contains("\"pm\": \"pnpm\""), "unexpected config: {config}");
}

/// Re-running init over an adopted project refreshes safe files without
/// clobbering a hand-edited `.env`.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_adoption_never_clobbers_edited_env() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::bare_node_project().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", &installed.entry_url)
        .arg("init")
        .assert()
        .success();

    std::fs::write(temp.path().join(".env"), "PORT=8080\n").unwrap();

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", &installed.entry_url)
        .arg("init")
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(temp.path().join(".env")).unwrap(), "PORT=8080\n");
}
