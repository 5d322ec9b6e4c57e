//! Integration tests for the registry resolution protocol.
//!
//! These drive the real `RegistryClient` against the in-process fixture
//! server: pointer resolution, entry URL handling, bounded retries with
//! request counting, and content integrity verification.

use serde_json::json;

use zuro_cli::core::ZuroError;
use zuro_cli::registry::{RegistryClient, find_module};
use zuro_cli::test_utils::{
    ModuleFixture, RegistryBuilder, RegistryFixture, init_test_logging, sha256_hex,
    standard_registry,
};

const POINTER_PATH: &str = "/registry/channels/stable.json";
const MANIFEST_PATH: &str = "/registry/v1.2.0/index.json";

/// Resolving the stable pointer yields the versioned manifest, with file
/// URLs based next to it.
#[tokio::test]
async fn test_pointer_resolves_to_versioned_manifest() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    assert!(resolved.manifest.modules.contains_key("core"));
    assert!(resolved.manifest_url.as_str().ends_with(MANIFEST_PATH));
    assert!(resolved.file_base_url.as_str().ends_with("/registry/v1.2.0/"));
    assert_eq!(server.hits(POINTER_PATH).await, 1);
    assert_eq!(server.hits(MANIFEST_PATH).await, 1);
}

/// A bare base URL gets the stable channel path appended.
#[tokio::test]
async fn test_base_url_appends_stable_channel_path() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let client = RegistryClient::new(Some(&installed.base_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    assert!(resolved.manifest.modules.contains_key("docs"));
    assert_eq!(server.hits(POINTER_PATH).await, 1);
}

/// An entry URL naming a manifest document directly skips the pointer hop.
#[tokio::test]
async fn test_manifest_entry_url_skips_pointer() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let client = RegistryClient::new(Some(&installed.manifest_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    assert!(resolved.manifest.modules.contains_key("core"));
    assert_eq!(server.hits(POINTER_PATH).await, 0);
}

/// `indexUrl` wins over `indexPath` when a pointer carries both.
#[tokio::test]
async fn test_pointer_index_url_takes_precedence() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let pointer = json!({
        "schemaVersion": 1,
        "channel": "stable",
        "indexPath": "../nowhere/index.json",
        "indexUrl": installed.manifest_url,
    });
    server.route_json("/alt/stable.json", &pointer).await;

    let client = RegistryClient::new(Some(&server.url("/alt/stable.json"))).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    assert!(resolved.manifest_url.as_str().ends_with(MANIFEST_PATH));
    assert_eq!(server.hits("/nowhere/index.json").await, 0);
}

/// Transient server errors are retried and the request then succeeds.
#[tokio::test]
async fn test_transient_pointer_errors_are_retried() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;
    server.fail_first(POINTER_PATH, 2).await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    assert!(resolved.manifest.modules.contains_key("core"));
    assert_eq!(server.hits(POINTER_PATH).await, 3);
}

/// The retry budget is three total tries per request.
#[tokio::test]
async fn test_retry_budget_is_bounded() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;
    server.fail_first(POINTER_PATH, 10).await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let error = client.fetch_registry().await.unwrap_err();

    assert_eq!(server.hits(POINTER_PATH).await, 3);
    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::RegistryStatus { status, .. }) => assert_eq!(*status, 500),
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A 404 is deterministic and never retried.
#[tokio::test]
async fn test_missing_document_is_not_retried() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;

    let client = RegistryClient::new(Some(&server.url(POINTER_PATH))).unwrap();
    let error = client.fetch_registry().await.unwrap_err();

    assert_eq!(server.hits(POINTER_PATH).await, 1);
    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::RegistryStatus { status, .. }) => assert_eq!(*status, 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A pointer resolving to another pointer is a protocol error.
#[tokio::test]
async fn test_pointer_chain_is_rejected() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let inner = json!({
        "schemaVersion": 1,
        "channel": "stable",
        "indexPath": "../v1.2.0/index.json",
    });
    server.route_json("/registry/v0/index.json", &inner).await;
    let outer = json!({
        "schemaVersion": 1,
        "channel": "stable",
        "indexPath": "v0/index.json",
    });
    server.route_json("/registry/stable.json", &outer).await;

    let client = RegistryClient::new(Some(&server.url("/registry/stable.json"))).unwrap();
    let error = client.fetch_registry().await.unwrap_err();

    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::ProtocolError { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A JSON document that is neither manifest nor pointer is rejected.
#[tokio::test]
async fn test_unclassifiable_document_is_rejected() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    server.route_json("/registry/odd.json", &json!({ "hello": "world" })).await;

    let client = RegistryClient::new(Some(&server.url("/registry/odd.json"))).unwrap();
    let error = client.fetch_registry().await.unwrap_err();

    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::ProtocolError { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

/// File URLs resolve against the manifest's final URL after a redirect, so
/// a relocated registry keeps serving files from its new home.
#[tokio::test]
async fn test_redirected_manifest_rebases_file_urls() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;
    server.redirect("/moved/index.json", &installed.manifest_url).await;

    let client = RegistryClient::new(Some(&server.url("/moved/index.json"))).unwrap();
    let resolved = client.fetch_registry().await.unwrap();
    assert!(resolved.file_base_url.as_str().ends_with("/registry/v1.2.0/"));

    let core = find_module(&resolved.manifest, "core").unwrap();
    let app = core.files.iter().find(|file| file.target == "app.ts").unwrap();
    let content = client.fetch_file(&resolved.file_base_url, app).await.unwrap();
    assert!(content.contains("export default app;"));
}

/// Fetched file content matches the digest recorded in the manifest.
#[tokio::test]
async fn test_fetch_file_returns_verified_content() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = standard_registry().install(&server).await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();

    let core = find_module(&resolved.manifest, "core").unwrap();
    let env = core.files.iter().find(|file| file.target == "env.ts").unwrap();
    let content = client.fetch_file(&resolved.file_base_url, env).await.unwrap();

    assert_eq!(sha256_hex(&content), env.sha256.clone().unwrap());
}

/// A checksum mismatch is fatal and the request is not retried.
#[tokio::test]
async fn test_checksum_mismatch_fails_without_retry() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let installed = RegistryBuilder::new()
        .module(ModuleFixture::new("broken").file_with_integrity(
            "broken/file.ts",
            "file.ts",
            "export {};\n",
            "0000000000000000000000000000000000000000000000000000000000000000",
            11,
        ))
        .install(&server)
        .await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();
    let module = find_module(&resolved.manifest, "broken").unwrap();

    let error = client.fetch_file(&resolved.file_base_url, &module.files[0]).await.unwrap_err();
    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::ChecksumMismatch { .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.hits("/registry/v1.2.0/broken/file.ts").await, 1);
}

/// A size mismatch is reported before the digest comparison.
#[tokio::test]
async fn test_size_mismatch_fails_without_retry() {
    init_test_logging(None);
    let server = RegistryFixture::start().await;
    let content = "export {};\n";
    let installed = RegistryBuilder::new()
        .module(ModuleFixture::new("truncated").file_with_integrity(
            "truncated/file.ts",
            "file.ts",
            content,
            &sha256_hex(content),
            999,
        ))
        .install(&server)
        .await;

    let client = RegistryClient::new(Some(&installed.entry_url)).unwrap();
    let resolved = client.fetch_registry().await.unwrap();
    let module = find_module(&resolved.manifest, "truncated").unwrap();

    let error = client.fetch_file(&resolved.file_base_url, &module.files[0]).await.unwrap_err();
    match error.downcast_ref::<ZuroError>() {
        Some(ZuroError::SizeMismatch { expected, .. }) => assert_eq!(*expected, 999),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.hits("/registry/v1.2.0/truncated/file.ts").await, 1);
}
