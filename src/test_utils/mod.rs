//! Shared test infrastructure
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration suite. Provides project tree fixtures and module file
//! templates ([`fixtures`]), an in-process HTTP registry with programmable
//! failure modes ([`registry`]) and one-shot logging setup for tests.

pub mod fixtures;
pub mod registry;

pub use fixtures::ProjectFixture;
pub use registry::{
    InstalledRegistry, ModuleFixture, RegistryBuilder, RegistryFixture, sha256_hex,
    standard_registry,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initializes logging for tests, once per process.
///
/// An explicit level wins over `RUST_LOG`; with neither set, no subscriber
/// is installed and tests run quiet.
///
/// # Examples
///
/// ```
/// use zuro_cli::test_utils::init_test_logging;
///
/// init_test_logging(Some(tracing::Level::DEBUG));
/// tracing::debug!("visible when the test runs with --nocapture");
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        // try_init tolerates a subscriber installed by another harness.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
