//! CLI command handling
//!
//! Wires configuration, the system process runner and the suite together.

use std::path::PathBuf;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing::{print_summary, Suite, SuiteReport, SuiteSettings, SystemRunner};

/// Printed when no test file or directory is given
pub const USAGE: &str = "Usage: fixture-harness <FILE-OR-DIR> ...";

/// Run the suite for the given paths and print the final summary
pub async fn dispatch(paths: &[PathBuf]) -> Result<SuiteReport> {
    if paths.is_empty() {
        return Err(Error::Usage);
    }

    let config = Config::load()?;
    let harness_dir = std::env::current_dir()?;
    tracing::debug!(
        "Harness directory {}, fixture compiler {}",
        harness_dir.display(),
        config.fixtures.compiler.display()
    );

    let runner = SystemRunner::new(config.timeouts.process_limit());
    let suite = Suite::new(runner, SuiteSettings::from_config(&config, harness_dir));

    let report = suite.run(paths).await?;
    print_summary(&report);
    Ok(report)
}
