//! Cross-platform utilities and helpers
//!
//! This module provides utility functions for file operations, platform
//! helpers, and progress indicators. All utilities work consistently across
//! Windows, macOS, and Linux.
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes and containment checks
//! - [`platform`] - Platform-specific helpers
//! - [`progress`] - Progress bars and spinners for long-running operations
//!
//! # Example
//!
//! ```rust,no_run
//! use zuro_cli::utils::{ensure_dir, atomic_write, ProgressBar};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! // Ensure directory exists
//! ensure_dir(Path::new(".zuro/backups"))?;
//!
//! // Write file atomically
//! atomic_write(Path::new("zuro.json"), b"{}")?;
//!
//! // Show progress
//! let spinner = ProgressBar::new_spinner();
//! spinner.set_message("Working...");
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{
    atomic_write, ensure_dir, normalize_path, read_text_file, write_json_file, write_text_file,
};
pub use platform::{command_exists, is_windows, line_ending};
pub use progress::ProgressBar;
