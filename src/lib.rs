//! Zuro - registry-driven scaffolding for TypeScript Express APIs
//!
//! Zuro turns a remote module registry into working project code: `zuro
//! init` sets up an Express + TypeScript API from the core template, and
//! `zuro add` layers registry modules (auth, docs, database dialects,
//! error handling) on top, wiring them into the generated entrypoints.
//!
//! # Architecture Overview
//!
//! Zuro follows a channel/manifest model where:
//! - A channel pointer (`channels/stable.json`) names the current manifest
//! - The manifest lists modules, their files, and their dependencies
//! - Every file carries a sha256 digest that is verified after download
//! - `zuro.json` records per-project state (name, package manager, source
//!   directory)
//!
//! ## Key Features
//!
//! - **Registry-driven**: Templates live behind a versioned HTTP registry,
//!   not inside the binary
//! - **Integrity-checked**: Downloads are rejected on digest or size
//!   mismatch, with bounded retries for transient failures
//! - **Package manager aware**: Detects and drives npm, pnpm, yarn, or bun
//! - **Existing-project safe**: Initializing inside an existing project
//!   only touches files that cannot clobber hand-written code
//! - **Idempotent wiring**: Generated route mounts and middleware are
//!   injected into the app entrypoint exactly once, however often a module
//!   is re-added
//! - **Reversible database switches**: Changing dialects snapshots the
//!   current database files under `.zuro/backups/`
//!
//! # Core Modules
//!
//! ## Core Functionality
//! - [`cli`] - Command-line interface with the `init` and `add` commands
//! - [`core`] - Error types and user-facing error rendering
//! - [`registry`] - Registry protocol: channel resolution, manifest
//!   fetching, file downloads with integrity verification
//! - [`resolver`] - Installed-module detection and dependency resolution
//!
//! ## Project State
//! - [`project`] - `zuro.json` configuration reading and writing
//! - [`env`] - `.env` and env schema merging
//! - [`backup`] - Database file snapshots for dialect switches
//!
//! ## Scaffolding
//! - [`scaffold`] - Template file placement with path safety checks
//! - [`inject`] - Idempotent source injection for entrypoint wiring
//!
//! ## Supporting Modules
//! - [`pm`] - Package manager detection and invocation
//! - [`constants`] - Registry defaults, timeouts, and fixed file names
//! - [`utils`] - File system helpers, path validation, progress indicators
//!
//! # Project Configuration (zuro.json)
//!
//! ```json
//! {
//!   "name": "my-api",
//!   "pm": "pnpm",
//!   "srcDir": "src"
//! }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Initialize a project (fresh directory or existing project)
//! zuro init
//!
//! # Add modules from the registry
//! zuro add auth
//! zuro add docs
//! zuro add database        # prompts for a dialect
//! zuro add error-handler
//!
//! # Point at a different registry
//! ZURO_REGISTRY_URL=https://staging.zuro.dev/registry zuro add auth
//! ```

// Core functionality modules
pub mod cli;
pub mod constants;
pub mod core;
pub mod resolver;

// Registry access
pub mod registry;

// Project state
pub mod backup;
pub mod env;
pub mod project;

// Scaffolding
pub mod inject;
pub mod scaffold;

// Supporting modules
pub mod pm;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
