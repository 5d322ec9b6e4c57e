//! Integration test suite for Zuro
//!
//! End-to-end tests covering the registry protocol, project initialization,
//! module installation flows and the CLI surface. The suite runs fully
//! offline: every registry interaction goes through the in-process fixture
//! server from `zuro_cli::test_utils`, and every fixture module is free of
//! npm dependencies so no package manager is ever invoked.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **registry_protocol**: Channel pointer resolution, entry URL handling,
//!   bounded retries and content integrity
//! - **init_flow**: Initialization in fresh and pre-existing directories
//! - **add_flow**: Module installation, entrypoint wiring, dependency
//!   recursion and environment merges
//! - **cli_surface**: Argument parsing, help output and flag conflicts

mod add_flow;
mod cli_surface;
mod init_flow;
mod registry_protocol;
