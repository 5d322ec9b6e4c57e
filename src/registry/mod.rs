//! Module registry: wire types, resolution protocol, and integrity checks
//!
//! The registry is the remote source of truth for installable modules. This
//! module owns the whole client side of the protocol:
//!
//! - [`model`] - The pointer and manifest document shapes
//! - [`client`] - Two-hop resolution, retries, and content verification
//!
//! Lookup helpers live here so the CLI gets consistent "did you mean"
//! suggestions wherever a module name is resolved against a manifest.

pub mod client;
pub mod model;

pub use client::{RegistryClient, ResolvedRegistry};
pub use model::{ChannelPointer, RegistryDocument, RegistryFile, RegistryManifest, RegistryModule};

use strsim::levenshtein;

use crate::core::ZuroError;

const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Looks up a module by name, producing suggestions when it is absent.
///
/// # Errors
///
/// Returns [`ZuroError::ModuleNotFound`] carrying up to three close matches
/// from the manifest, ranked by edit distance.
pub fn find_module<'a>(
    manifest: &'a RegistryManifest,
    name: &str,
) -> Result<&'a RegistryModule, ZuroError> {
    manifest.module(name).ok_or_else(|| ZuroError::ModuleNotFound {
        name: name.to_string(),
        similar: find_similar_modules(name, &manifest.module_names()),
    })
}

/// Finds module names similar to `target` using Levenshtein distance.
fn find_similar_modules(target: &str, available: &[&str]) -> Vec<String> {
    let mut scored: Vec<_> = available
        .iter()
        .map(|name| {
            let distance = levenshtein(target, name);
            ((*name).to_string(), distance)
        })
        .collect();

    // Sort by distance (closest first)
    scored.sort_by_key(|(_, dist)| *dist);

    // Return top 3 suggestions within reasonable distance
    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(name, _)| name)
        .collect()
}
