//! HTTP client for the module registry
//!
//! Implements the two-hop resolution protocol: the configured entry URL is
//! fetched and classified by shape. A manifest is used directly; a channel
//! pointer is followed once, resolving its manifest location against the
//! pointer's own final URL so that registries behind redirects keep working.
//! A pointer that resolves to another pointer is a protocol error.
//!
//! Every request runs under a shared retry policy: up to
//! [`REGISTRY_MAX_RETRIES`] retries with linear backoff, each attempt bounded
//! by [`REGISTRY_REQUEST_TIMEOUT`]. Only transport failures and 5xx statuses
//! are retried. Integrity failures on file fetches are checked after the
//! transfer completes and are never retried, since a deterministic mismatch
//! cannot be fixed by asking again.

use anyhow::Result;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_REGISTRY_BASE_URL, REGISTRY_BACKOFF_STEP, REGISTRY_MAX_RETRIES,
    REGISTRY_REQUEST_TIMEOUT, REGISTRY_URL_ENV, STABLE_CHANNEL_PATH, USER_AGENT,
};
use crate::core::ZuroError;
use crate::registry::model::{RegistryDocument, RegistryFile, RegistryManifest};

/// A resolved registry: the manifest plus the URLs derived during resolution.
///
/// `file_base_url` is the manifest's URL with the final path segment removed.
/// File entries carry paths relative to that base, so colocating a manifest
/// and its files under one versioned prefix needs no per-file URLs.
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    /// The fetched manifest.
    pub manifest: RegistryManifest,
    /// URL the manifest was actually fetched from, after redirects.
    pub manifest_url: Url,
    /// Base URL that module file paths are resolved against.
    pub file_base_url: Url,
}

/// Client for fetching and verifying registry documents.
///
/// The entry URL is fixed at construction time. [`RegistryClient::from_env`]
/// reads the `ZURO_REGISTRY_URL` override once, so tests and local registries
/// can inject their own endpoint without touching process state afterwards.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    entry_url: Url,
}

impl RegistryClient {
    /// Creates a client from the environment, honoring `ZURO_REGISTRY_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let override_url = std::env::var(REGISTRY_URL_ENV).ok();
        Self::new(override_url.as_deref())
    }

    /// Creates a client with an explicit entry URL override.
    ///
    /// The override accepts either a full document URL (anything ending in
    /// `.json`, fetched as-is) or a base URL, in which case the stable
    /// channel pointer path is appended.
    ///
    /// # Errors
    ///
    /// Returns [`ZuroError::InvalidRegistryUrl`] if the resulting URL does
    /// not parse as an absolute URL.
    pub fn new(override_url: Option<&str>) -> Result<Self> {
        let entry_url = resolve_entry_url(override_url)?;
        let http = reqwest::Client::builder()
            .timeout(REGISTRY_REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, entry_url })
    }

    /// The entry URL this client fetches first.
    #[must_use]
    pub const fn entry_url(&self) -> &Url {
        &self.entry_url
    }

    /// Resolves the entry URL to a manifest, following one pointer hop.
    ///
    /// # Errors
    ///
    /// Returns a protocol error for payloads that are neither manifest nor
    /// pointer, for a pointer without a manifest location, and for pointer
    /// chains. Network and status errors surface after the retry policy is
    /// exhausted.
    pub async fn fetch_registry(&self) -> Result<ResolvedRegistry> {
        let (body, final_url) = self.get_with_retry(&self.entry_url).await?;

        let (manifest, manifest_url) = match classify_payload(&body, &final_url)? {
            RegistryDocument::Manifest(manifest) => (manifest, final_url),
            RegistryDocument::Pointer(pointer) => {
                let location =
                    pointer.index_location().ok_or_else(|| ZuroError::ProtocolError {
                        url: final_url.to_string(),
                        reason: "channel pointer names no manifest location".to_string(),
                    })?;
                // Resolve against the pointer's final URL, not the entry URL,
                // so redirected registries stay self-consistent.
                let manifest_url =
                    final_url.join(location).map_err(|e| ZuroError::ProtocolError {
                        url: final_url.to_string(),
                        reason: format!("cannot resolve manifest location '{location}': {e}"),
                    })?;
                debug!(manifest_url = %manifest_url, "Following channel pointer");

                let (body, manifest_final_url) = self.get_with_retry(&manifest_url).await?;
                match classify_payload(&body, &manifest_final_url)? {
                    RegistryDocument::Manifest(manifest) => (manifest, manifest_final_url),
                    RegistryDocument::Pointer(_) => {
                        return Err(ZuroError::ProtocolError {
                            url: manifest_final_url.to_string(),
                            reason: "channel pointer resolved to another pointer".to_string(),
                        }
                        .into());
                    }
                }
            }
        };

        let file_base_url = file_base_of(&manifest_url)?;
        debug!(
            manifest_url = %manifest_url,
            file_base_url = %file_base_url,
            modules = manifest.modules.len(),
            "Resolved registry manifest"
        );

        Ok(ResolvedRegistry {
            manifest,
            manifest_url,
            file_base_url,
        })
    }

    /// Fetches a module file and verifies its integrity.
    ///
    /// The file's registry path is resolved against `base_url`. When the
    /// manifest declares a size or a SHA-256 digest, the fetched content must
    /// match exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ZuroError::SizeMismatch`] or [`ZuroError::ChecksumMismatch`]
    /// for tampered content; these are fatal and never retried. Network and
    /// status errors surface after the retry policy is exhausted.
    pub async fn fetch_file(&self, base_url: &Url, file: &RegistryFile) -> Result<String> {
        let url = base_url.join(&file.path).map_err(|e| ZuroError::ProtocolError {
            url: base_url.to_string(),
            reason: format!("cannot resolve file path '{}': {e}", file.path),
        })?;

        let (content, _) = self.get_with_retry(&url).await?;
        verify_integrity(file, &content)?;
        Ok(content)
    }

    /// Runs a GET under the shared retry policy.
    ///
    /// Returns the response body and the final URL after redirects.
    async fn get_with_retry(&self, url: &Url) -> Result<(String, Url), ZuroError> {
        let start = Instant::now();
        let strategy =
            (1..=REGISTRY_MAX_RETRIES).map(|attempt| REGISTRY_BACKOFF_STEP * attempt as u32);

        let result = RetryIf::spawn(
            strategy,
            || self.get_once(url),
            |error: &ZuroError| {
                let retry = error.is_transient();
                if retry {
                    warn!(url = %url, error = %error, "Registry request failed, retrying");
                }
                retry
            },
        )
        .await;

        let elapsed = start.elapsed();
        if elapsed > Duration::from_secs(1) {
            info!(url = %url, elapsed_ms = elapsed.as_millis() as u64, "Slow registry request");
        } else if elapsed > Duration::from_millis(100) {
            debug!(url = %url, elapsed_ms = elapsed.as_millis() as u64, "Registry request took");
        }

        result
    }

    async fn get_once(&self, url: &Url) -> Result<(String, Url), ZuroError> {
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZuroError::RegistryStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| transport_error(url, &e))?;
        Ok((body, final_url))
    }
}

/// Parses a response body as JSON and classifies it by shape.
fn classify_payload(body: &str, url: &Url) -> Result<RegistryDocument, ZuroError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ZuroError::ProtocolError {
            url: url.to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
    RegistryDocument::classify(value).map_err(|reason| ZuroError::ProtocolError {
        url: url.to_string(),
        reason,
    })
}

/// Builds the entry URL from an optional override.
fn resolve_entry_url(override_url: Option<&str>) -> Result<Url, ZuroError> {
    let raw = override_url.unwrap_or(DEFAULT_REGISTRY_BASE_URL);
    let entry = if raw.ends_with(".json") {
        raw.to_string()
    } else {
        format!("{}/{STABLE_CHANNEL_PATH}", raw.trim_end_matches('/'))
    };
    Url::parse(&entry).map_err(|e| ZuroError::InvalidRegistryUrl {
        url: entry.clone(),
        reason: e.to_string(),
    })
}

/// Derives the file base URL: the manifest URL with its last segment dropped.
fn file_base_of(manifest_url: &Url) -> Result<Url, ZuroError> {
    manifest_url.join(".").map_err(|e| ZuroError::InvalidRegistryUrl {
        url: manifest_url.to_string(),
        reason: format!("cannot derive file base URL: {e}"),
    })
}

/// Checks fetched content against the manifest's declared size and digest.
fn verify_integrity(file: &RegistryFile, content: &str) -> Result<(), ZuroError> {
    if let Some(expected) = file.size {
        let actual = content.len() as u64;
        if actual != expected {
            return Err(ZuroError::SizeMismatch {
                name: file.path.clone(),
                expected,
                actual,
            });
        }
    }

    if let Some(expected) = file.sha256.as_deref() {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let actual = hex::encode(hasher.finalize());
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ZuroError::ChecksumMismatch {
                name: file.path.clone(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok(())
}

fn transport_error(url: &Url, error: &reqwest::Error) -> ZuroError {
    let reason = if error.is_timeout() {
        format!("request timed out after {}s", REGISTRY_REQUEST_TIMEOUT.as_secs())
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    ZuroError::NetworkError {
        operation: format!("GET {url}"),
        reason,
    }
}
