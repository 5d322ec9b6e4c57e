//! Wire types for the module registry protocol
//!
//! The registry publishes JSON documents in two shapes: a small **channel
//! pointer** that names the current manifest location for a release channel,
//! and the **manifest** itself, a versioned map of module name to module
//! definition. Both are transient: fetched fresh per command invocation and
//! never persisted.
//!
//! Classification between the two shapes is structural. A payload carrying a
//! `modules` map is a manifest; a payload carrying `indexPath` or `indexUrl`
//! is a pointer; anything else is a protocol error. See
//! [`RegistryDocument::classify`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel pointer document.
///
/// A cache-friendly indirection that names where the current manifest for a
/// channel lives, so the registry can roll manifests forward without breaking
/// cached pointer URLs. The manifest location is given either as a URL
/// (`indexUrl`) or as a path (`indexPath`) resolved against the pointer's own
/// final URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPointer {
    /// Pointer document format version.
    pub schema_version: u32,

    /// Release channel this pointer serves (e.g. "stable").
    #[serde(default)]
    pub channel: Option<String>,

    /// Template version the referenced manifest was generated from.
    #[serde(default)]
    pub template_version: Option<String>,

    /// Generation timestamp, informational only.
    #[serde(default)]
    pub generated_at: Option<String>,

    /// Manifest location as a path, resolved against the pointer's URL.
    #[serde(default)]
    pub index_path: Option<String>,

    /// Manifest location as a full URL. Takes precedence over `index_path`.
    #[serde(default)]
    pub index_url: Option<String>,
}

impl ChannelPointer {
    /// Returns the manifest location named by this pointer.
    ///
    /// Prefers `indexUrl` over `indexPath` when both are present. Returns
    /// `None` for a malformed pointer naming neither.
    #[must_use]
    pub fn index_location(&self) -> Option<&str> {
        self.index_url.as_deref().or(self.index_path.as_deref())
    }
}

/// Registry manifest: the versioned map of installable modules.
///
/// An immutable snapshot. Commands fetch it, read the modules they need, and
/// discard it; nothing is cached across invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryManifest {
    /// Manifest document format version.
    pub schema_version: u32,

    /// Publication status of this manifest snapshot.
    #[serde(default)]
    pub status: Option<String>,

    /// Version of the template set this manifest describes.
    #[serde(default)]
    pub template_version: Option<String>,

    /// Generation timestamp, informational only.
    #[serde(default)]
    pub generated_at: Option<String>,

    /// Module name to module definition.
    ///
    /// A `BTreeMap` keeps iteration deterministic, which matters for stable
    /// "did you mean" suggestions and reproducible test output.
    pub modules: BTreeMap<String, RegistryModule>,
}

impl RegistryManifest {
    /// Looks up a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&RegistryModule> {
        self.modules.get(name)
    }

    /// Returns all module names in sorted order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }
}

/// A single installable module as published in the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryModule {
    /// Module category (e.g. "feature", "base"), informational only.
    #[serde(default, rename = "type")]
    pub module_type: Option<String>,

    /// Human-readable description shown in listings.
    #[serde(default)]
    pub description: Option<String>,

    /// Files to scaffold into the project, in declaration order.
    #[serde(default)]
    pub files: Vec<RegistryFile>,

    /// Names of other registry modules that must be present first.
    ///
    /// These are module names, not npm packages. The abstract name
    /// `database` is satisfied by either concrete dialect module.
    #[serde(default)]
    pub module_dependencies: Vec<String>,

    /// Runtime npm packages this module needs.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Development-only npm packages this module needs.
    #[serde(default)]
    pub dev_dependencies: Vec<String>,
}

/// A single file entry within a module definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryFile {
    /// Registry-relative source path, fetched from the file base URL.
    pub path: String,

    /// Project-relative destination, joined onto the configured source
    /// directory. May use a leading `../` to reach project-root-level files
    /// such as `drizzle.config.ts`, but must never resolve outside the
    /// project root.
    pub target: String,

    /// File category, informational only.
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,

    /// Expected SHA-256 digest of the file content, lowercase hex.
    #[serde(default)]
    pub sha256: Option<String>,

    /// Expected byte length of the file content.
    #[serde(default)]
    pub size: Option<u64>,
}

/// A fetched registry document, classified by shape.
#[derive(Debug, Clone)]
pub enum RegistryDocument {
    /// Payload was a full manifest.
    Manifest(RegistryManifest),
    /// Payload was a channel pointer to a manifest elsewhere.
    Pointer(ChannelPointer),
}

impl RegistryDocument {
    /// Classifies a JSON payload as a manifest or a channel pointer.
    ///
    /// The decision is structural: a `modules` map means manifest, an
    /// `indexPath` or `indexUrl` field means pointer.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the payload is neither
    /// shape or fails to deserialize into the classified shape. The caller
    /// attaches the URL and converts this into a protocol error.
    pub fn classify(value: serde_json::Value) -> Result<Self, String> {
        let Some(object) = value.as_object() else {
            return Err("expected a JSON object".to_string());
        };

        if object.contains_key("modules") {
            let manifest: RegistryManifest = serde_json::from_value(value)
                .map_err(|e| format!("malformed manifest: {e}"))?;
            return Ok(Self::Manifest(manifest));
        }

        if object.contains_key("indexPath") || object.contains_key("indexUrl") {
            let pointer: ChannelPointer = serde_json::from_value(value)
                .map_err(|e| format!("malformed channel pointer: {e}"))?;
            return Ok(Self::Pointer(pointer));
        }

        Err("payload is neither a manifest (no 'modules') nor a channel pointer (no 'indexPath'/'indexUrl')".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_manifest() {
        let value = json!({
            "schemaVersion": 1,
            "templateVersion": "1.2.0",
            "modules": {
                "core": {
                    "type": "base",
                    "files": [
                        {"path": "express/env.ts", "target": "env.ts", "sha256": "ab", "size": 10}
                    ],
                    "dependencies": ["zod", "dotenv"]
                }
            }
        });

        match RegistryDocument::classify(value).unwrap() {
            RegistryDocument::Manifest(manifest) => {
                assert_eq!(manifest.schema_version, 1);
                let module = manifest.module("core").unwrap();
                assert_eq!(module.files.len(), 1);
                assert_eq!(module.files[0].target, "env.ts");
                assert_eq!(module.files[0].size, Some(10));
                assert_eq!(module.dependencies, vec!["zod", "dotenv"]);
                assert!(module.module_dependencies.is_empty());
            }
            RegistryDocument::Pointer(_) => panic!("classified as pointer"),
        }
    }

    #[test]
    fn test_classify_pointer_with_path() {
        let value = json!({
            "schemaVersion": 1,
            "channel": "stable",
            "templateVersion": "1.2.0",
            "generatedAt": "2025-01-01T00:00:00Z",
            "indexPath": "/v1.2.0/index.json"
        });

        match RegistryDocument::classify(value).unwrap() {
            RegistryDocument::Pointer(pointer) => {
                assert_eq!(pointer.index_location(), Some("/v1.2.0/index.json"));
                assert_eq!(pointer.channel.as_deref(), Some("stable"));
            }
            RegistryDocument::Manifest(_) => panic!("classified as manifest"),
        }
    }

    #[test]
    fn test_classify_pointer_prefers_url() {
        let value = json!({
            "schemaVersion": 1,
            "indexPath": "/v1.2.0/index.json",
            "indexUrl": "https://cdn.example.com/v1.2.0/index.json"
        });

        match RegistryDocument::classify(value).unwrap() {
            RegistryDocument::Pointer(pointer) => {
                assert_eq!(pointer.index_location(), Some("https://cdn.example.com/v1.2.0/index.json"));
            }
            RegistryDocument::Manifest(_) => panic!("classified as manifest"),
        }
    }

    #[test]
    fn test_classify_rejects_unknown_shape() {
        let err = RegistryDocument::classify(json!({"hello": "world"})).unwrap_err();
        assert!(err.contains("neither a manifest"));

        let err = RegistryDocument::classify(json!([1, 2, 3])).unwrap_err();
        assert!(err.contains("JSON object"));
    }

    #[test]
    fn test_module_names_sorted() {
        let value = json!({
            "schemaVersion": 1,
            "modules": {"logger": {}, "auth": {}, "core": {}}
        });
        let RegistryDocument::Manifest(manifest) = RegistryDocument::classify(value).unwrap() else {
            panic!("classified as pointer");
        };
        assert_eq!(manifest.module_names(), vec!["auth", "core", "logger"]);
    }
}
