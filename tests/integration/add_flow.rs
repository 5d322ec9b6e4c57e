//! Integration tests for module installation.
//!
//! These spawn the real binary against the in-process registry fixture and
//! a project tree on disk, covering scaffolding, entrypoint wiring,
//! dependency recursion, environment merges and the non-interactive
//! behavior of every prompt in the flow. Fixture modules carry no npm
//! dependencies, so no package manager binary is required.
//!
//! Every test runs multi-threaded: the child process blocks one worker
//! while the registry fixture answers on another.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

use zuro_cli::pm::PackageManager;
use zuro_cli::test_utils::{ModuleFixture, ProjectFixture, RegistryFixture, standard_registry};

fn zuro(project: &Path, entry_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(project).env("ZURO_REGISTRY_URL", entry_url);
    cmd
}

/// Adding a module scaffolds its files under the source directory.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_scaffolds_module_files() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✔ docs added successfully!"));

    assert!(temp.path().join("src/lib/openapi.ts").exists());
    assert!(temp.path().join("src/routes/docs.routes.ts").exists());
}

/// The docs route mount is injected into `app.ts`, above the default
/// export.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_wires_docs_mount_into_app() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url).args(["add", "docs"]).assert().success();

    let app = std::fs::read_to_string(temp.path().join("src/app.ts")).unwrap();
    assert!(app.contains("import docsRouter from \"./routes/docs.routes\";"));

    let usage = app.find("app.use(\"/api/docs\", docsRouter);").unwrap();
    let export = app.find("export default app;").unwrap();
    assert!(usage < export, "docs mount must precede the default export");
}

/// Re-adding a module leaves every touched file byte-identical.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_repeat_add_is_idempotent() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url).args(["add", "docs"]).assert().success();
    let app_first = std::fs::read_to_string(temp.path().join("src/app.ts")).unwrap();
    let openapi_first = std::fs::read_to_string(temp.path().join("src/lib/openapi.ts")).unwrap();

    zuro(temp.path(), &installed.entry_url).args(["add", "docs"]).assert().success();
    let app_second = std::fs::read_to_string(temp.path().join("src/app.ts")).unwrap();
    let openapi_second = std::fs::read_to_string(temp.path().join("src/lib/openapi.ts")).unwrap();

    assert_eq!(app_first, app_second);
    assert_eq!(openapi_first, openapi_second);
}

/// Adding a database dialect scaffolds the Drizzle files, places the
/// drizzle-kit config at the project root and merges the connection
/// string into `.env` and the schema.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_database_scaffolds_and_merges_env() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "database-pg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Action Required"))
        .stdout(predicate::str::contains("DATABASE_URL"));

    assert!(temp.path().join("src/db/index.ts").exists());
    assert!(temp.path().join("src/db/schema.ts").exists());
    assert!(temp.path().join("drizzle.config.ts").exists());
    assert!(!temp.path().join("src/drizzle.config.ts").exists());

    let env_file = std::fs::read_to_string(temp.path().join(".env")).unwrap();
    assert!(env_file.contains("PORT=3000"), "existing entries must survive the merge");
    assert!(env_file.contains("DATABASE_URL=postgresql://"));

    let env_schema = std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap();
    assert!(env_schema.contains("DATABASE_URL: z.string().url(),"));
}

/// Resolving the abstract database dependency needs a terminal, so adding
/// auth to a database-less project fails with concrete alternatives.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_auth_without_database_fails_without_terminal() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "auth"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Module 'auth' requires: database"))
        .stdout(predicate::str::contains("To retry, run:"))
        .stdout(predicate::str::contains("zuro add auth"))
        .stderr(predicate::str::contains("zuro add database-pg"))
        .stderr(predicate::str::contains("zuro add database-mysql"));

    assert!(!temp.path().join("src/lib/auth.ts").exists());
}

/// With a database already present, auth installs without prompting and
/// wires its handler into `app.ts`.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_auth_with_database_present() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().with_postgres().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✔ auth added successfully!"))
        .stdout(predicate::str::contains("Module 'auth' requires").not());

    let app = std::fs::read_to_string(temp.path().join("src/app.ts")).unwrap();
    assert!(app.contains("import { toNodeHandler } from \"better-auth/node\";"));
    assert!(app.contains("app.all(\"/api/auth/*\", toNodeHandler(auth));"));

    let env_file = std::fs::read_to_string(temp.path().join(".env")).unwrap();
    assert!(env_file.contains("BETTER_AUTH_SECRET="));
    assert!(env_file.contains("BETTER_AUTH_URL="));

    let env_schema = std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap();
    assert!(env_schema.contains("BETTER_AUTH_SECRET: z.string().min(32),"));

    // Docs are not installed, so no OpenAPI registration appears.
    assert!(!temp.path().join("src/lib/openapi.ts").exists());
}

/// Adding docs to a project that already has auth registers the auth
/// OpenAPI paths inside the marker block.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_docs_added_after_auth_registers_auth_paths() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().with_postgres().with_auth().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url).args(["add", "docs"]).assert().success();

    let openapi = std::fs::read_to_string(temp.path().join("src/lib/openapi.ts")).unwrap();
    assert!(openapi.contains("import { registerAuthPaths } from \"./openapi.auth\";"));

    let usage = openapi.find("registerAuthPaths(registry);").unwrap();
    let marker = openapi.find("// ZURO_DOCS_MODULES_END").unwrap();
    assert!(usage < marker, "registration must sit inside the marker block");
}

/// The same registration happens in the other order: auth added to a
/// project that already has docs.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_auth_added_after_docs_registers_auth_paths() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().with_postgres().with_docs().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url).args(["add", "auth"]).assert().success();

    let openapi = std::fs::read_to_string(temp.path().join("src/lib/openapi.ts")).unwrap();
    assert!(openapi.contains("registerAuthPaths(registry);"));
}

/// Switching dialects asks for confirmation; without a terminal the
/// switch cancels and the existing files stay untouched.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dialect_switch_cancels_without_terminal() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().with_postgres().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "database-mysql"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    let db = std::fs::read_to_string(temp.path().join("src/db/index.ts")).unwrap();
    assert!(db.contains("node-postgres"), "the installed dialect must survive a cancelled switch");
    assert!(!temp.path().join(".zuro").exists(), "no backup is taken before confirmation");
}

/// Module dependencies install depth-first before the requested module.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_module_dependency_chain_installs_prerequisites() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry()
        .module(
            ModuleFixture::new("reporting")
                .module_type("feature")
                .requires("docs")
                .file("reporting/lib/reporting.ts", "lib/reporting.ts", "export const report = 1;\n"),
        )
        .install(&server)
        .await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "reporting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Module 'reporting' requires: docs"))
        .stdout(predicate::str::contains("✔ reporting added successfully!"));

    assert!(temp.path().join("src/lib/reporting.ts").exists());
    assert!(temp.path().join("src/routes/docs.routes.ts").exists());

    // The prerequisite went through its own full install, wiring included.
    let app = std::fs::read_to_string(temp.path().join("src/app.ts")).unwrap();
    assert!(app.contains("app.use(\"/api/docs\", docsRouter);"));
}

/// An unknown module fails with a did-you-mean suggestion.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_unknown_module_suggests_close_match() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url)
        .args(["add", "docz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'docz' not found in registry"))
        .stderr(predicate::str::contains("Did you mean"))
        .stderr(predicate::str::contains("docs"));
}

/// Outside a managed project, add refuses before contacting the registry.
#[test]
fn test_add_outside_managed_project_fails() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", "http://127.0.0.1:9/registry")
        .args(["add", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not managed by Zuro"))
        .stderr(predicate::str::contains("zuro init"));
}

/// Adding the abstract database module needs a terminal to pick a dialect.
#[test]
fn test_add_abstract_database_requires_terminal() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized().write_to(temp.path());

    let mut cmd = Command::cargo_bin("zuro").unwrap();
    cmd.current_dir(temp.path())
        .env("ZURO_REGISTRY_URL", "http://127.0.0.1:9/registry")
        .args(["add", "database"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zuro add database-pg"))
        .stderr(predicate::str::contains("zuro add database-mysql"));
}

/// A custom source directory from the config is honored end to end.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_respects_custom_source_directory() {
    let temp = TempDir::new().unwrap();
    ProjectFixture::initialized_with(PackageManager::Npm, "app").write_to(temp.path());
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    zuro(temp.path(), &installed.entry_url).args(["add", "docs"]).assert().success();

    assert!(temp.path().join("app/lib/openapi.ts").exists());
    assert!(!temp.path().join("src").exists());

    let app = std::fs::read_to_string(temp.path().join("app/app.ts")).unwrap();
    assert!(app.contains("app.use(\"/api/docs\", docsRouter);"));
}
