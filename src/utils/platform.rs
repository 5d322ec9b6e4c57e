//! Platform-specific helpers
//!
//! Zuro runs the same code path on Windows, macOS, and Linux. The few places
//! where platforms diverge, package manager executable lookup and the line
//! ending used when appending to `.env` files, go through this module.

/// Checks if the current platform is Windows.
///
/// This is a compile-time check used when choosing line endings and when
/// formatting platform-specific error guidance.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the line ending used when appending to text files.
///
/// Appended `.env` entries use the platform convention so that files edited
/// with native tools stay consistent.
#[must_use]
pub const fn line_ending() -> &'static str {
    if is_windows() {
        "\r\n"
    } else {
        "\n"
    }
}

/// Checks if a command is available in the system PATH.
///
/// Used to verify a package manager executable exists before spawning it, so
/// the user gets an installation hint instead of a raw spawn failure.
///
/// # Examples
///
/// ```rust,no_run
/// use zuro_cli::utils::platform::command_exists;
///
/// if !command_exists("pnpm") {
///     eprintln!("pnpm is not installed");
/// }
/// ```
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}
