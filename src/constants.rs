//! Global constants used throughout the Zuro codebase.
//!
//! This module contains timeout durations, retry parameters, registry
//! defaults, and fixed file names that are used across multiple modules.
//! Defining them centrally improves maintainability and makes magic
//! numbers more discoverable.

use std::time::Duration;

/// Default registry base URL used when `ZURO_REGISTRY_URL` is not set.
///
/// The stable channel pointer lives at `{base}/channels/stable.json`.
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://zuro.dev/registry";

/// Path of the stable channel pointer relative to a registry base URL.
pub const STABLE_CHANNEL_PATH: &str = "channels/stable.json";

/// Environment variable overriding the registry entry URL.
///
/// Accepts either a full pointer/manifest document URL (ending in `.json`)
/// or a base URL, in which case the stable channel path is appended.
pub const REGISTRY_URL_ENV: &str = "ZURO_REGISTRY_URL";

/// Environment variable that disables progress bars and spinners.
pub const NO_PROGRESS_ENV: &str = "ZURO_NO_PROGRESS";

/// Per-attempt timeout for registry HTTP requests (8 seconds).
///
/// Applies to each individual try, not the whole retry sequence. A hung
/// connection is aborted and counted as a transient failure.
pub const REGISTRY_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Maximum number of retries after the initial registry request (2).
///
/// Together with the first attempt this bounds every endpoint at 3 total
/// tries. Only transient failures (5xx, transport errors) are retried.
pub const REGISTRY_MAX_RETRIES: usize = 2;

/// Linear backoff step between registry retries (250ms).
///
/// The nth retry waits `n * REGISTRY_BACKOFF_STEP` before firing.
pub const REGISTRY_BACKOFF_STEP: Duration = Duration::from_millis(250);

/// Timeout for package manager install commands (10 minutes).
///
/// Cold installs on slow networks can legitimately take several minutes;
/// anything beyond this indicates a hung process or an interactive prompt
/// waiting for input.
pub const PM_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Per-project configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "zuro.json";

/// Dotfolder under the project root holding Zuro-managed state (backups).
pub const DOTFOLDER: &str = ".zuro";

/// Default source directory for new projects.
pub const DEFAULT_SRC_DIR: &str = "src";

/// User agent sent with registry requests.
pub const USER_AGENT: &str = concat!("zuro-cli/", env!("CARGO_PKG_VERSION"));
