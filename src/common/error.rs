//! Error types for the fixture harness
//!
//! These errors abort a whole harness invocation, unless they are raised
//! while a test case is running: then the case is recorded as a
//! `RunOutcome::HarnessError` and the suite continues.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fixture harness
#[derive(Error, Debug)]
pub enum Error {
    // === Invocation Errors ===
    #[error("No test files or directories given")]
    Usage,

    // === Test File Errors ===
    #[error("Malformed test file '{path}': {reason}")]
    Format { path: String, reason: String },

    #[error("Failed to scan '{path}' for test files: {error}")]
    Discovery { path: String, error: String },

    // === Process Errors ===
    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },
}

impl Error {
    /// Create a format error for a test file
    pub fn format(path: &Path, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create a spawn error for a program that could not be started
    pub fn spawn(program: impl std::fmt::Display, error: &io::Error) -> Self {
        Self::Spawn {
            program: program.to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file write error
    pub fn file_write(path: &Path, error: &io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
