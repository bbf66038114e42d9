//! Configuration file handling

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::paths::{config_path, default_workdir_root};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Fixture compiler settings
    #[serde(default)]
    pub fixtures: FixturesConfig,

    /// Test file discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Working directory allocation
    #[serde(default)]
    pub workdir: WorkdirConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Test file grammar settings
    #[serde(default)]
    pub grammar: GrammarConfig,
}

/// Fixture compiler settings
#[derive(Debug, Deserialize)]
pub struct FixturesConfig {
    /// Program that turns one YAML document into a binary on stdout
    #[serde(default = "default_compiler")]
    pub compiler: PathBuf,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
        }
    }
}

fn default_compiler() -> PathBuf {
    PathBuf::from("yaml2obj")
}

/// Test file discovery settings
#[derive(Debug, Deserialize)]
pub struct DiscoveryConfig {
    /// File name suffix that marks a test file inside a directory
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_suffix() -> String {
    ".test".to_string()
}

/// Working directory allocation
#[derive(Debug, Deserialize)]
pub struct WorkdirConfig {
    /// Parent directory for per-case working directories
    #[serde(default = "default_workdir_root")]
    pub root: PathBuf,

    /// Name prefix for per-case working directories
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for WorkdirConfig {
    fn default() -> Self {
        Self {
            root: default_workdir_root(),
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "fixture-harness-".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Default)]
pub struct Timeouts {
    /// Wall-clock limit for every child process; 0 disables it
    #[serde(default)]
    pub process_secs: u64,
}

impl Timeouts {
    /// The process limit, if one is configured
    pub fn process_limit(&self) -> Option<Duration> {
        (self.process_secs > 0).then(|| Duration::from_secs(self.process_secs))
    }
}

/// Strategy used to find the invocation line in a test file
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    /// First line starting with the command marker, scanning from the top
    #[default]
    Scan,
    /// Command line must directly follow the last `...` document-end line
    Delimited,
}

/// Test file grammar settings
#[derive(Debug, Deserialize, Default)]
pub struct GrammarConfig {
    #[serde(default)]
    pub locator: LocatorKind,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| super::Error::file_read(&path, &e))?;
                return Self::from_toml(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discovery.suffix.is_empty() {
            return Err(super::Error::Config(
                "discovery.suffix must not be empty".to_string(),
            ));
        }
        if self.fixtures.compiler.as_os_str().is_empty() {
            return Err(super::Error::Config(
                "fixtures.compiler must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
