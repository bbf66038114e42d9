//! Configuration and scratch paths
//!
//! Linux: `$XDG_CONFIG_HOME/fixture-harness/config.toml`
//! macOS: `~/Library/Application Support/fixture-harness/config.toml`

use std::path::PathBuf;

/// Name used for the configuration directory
const APP_NAME: &str = "fixture-harness";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Directory under which working directories are allocated by default
pub fn default_workdir_root() -> PathBuf {
    std::env::temp_dir()
}
