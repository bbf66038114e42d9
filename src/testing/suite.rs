//! Suite orchestration
//!
//! Discovers test files, runs each one through provision -> invoke ->
//! verify, and folds the outcomes into a [`SuiteReport`]. Cases run strictly
//! one after another; a failing case never stops the suite.

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use walkdir::WalkDir;

use super::case::{locator_for, CommandLocator, TestCase};
use super::invoke::invoke_sut;
use super::process::{ProcessRunner, ProcessStatus};
use super::provision::{provision_fixtures, Provisioning};
use super::verify::{verify_output, Verdict};
use super::workdir::WorkingDirectory;
use crate::common::config::Config;
use crate::common::{Error, Result};

/// Outcome of running one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Pass,
    /// The fixture compiler failed on document `index`
    ProvisioningError { index: usize, reason: String },
    /// The SUT exited nonzero or was killed; output was not compared
    Crashed { status: ProcessStatus },
    /// The SUT succeeded but its stdout differs from the expected output
    Mismatch { diff: String },
    /// The SUT exceeded the configured wall-clock limit
    TimedOut { limit: Duration },
    /// The harness itself failed mid-case (spawn or artifact I/O)
    HarnessError { reason: String },
}

impl RunOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Classification tag printed next to failing files
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Pass => "PASSED",
            Self::ProvisioningError { .. } => "PROVISIONING FAILED",
            Self::Crashed { .. } => "CRASHED",
            Self::Mismatch { .. } => "FAILED",
            Self::TimedOut { .. } => "TIMED OUT",
            Self::HarnessError { .. } => "HARNESS ERROR",
        }
    }
}

/// A failed case whose working directory was kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub source_path: PathBuf,
    pub retained_dir: PathBuf,
    pub tag: &'static str,
}

/// Aggregated results of one harness invocation
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: usize,
    /// Failures in the order the cases were processed
    pub failures: Vec<Failure>,
}

impl SuiteReport {
    /// True when no case failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// First line of the final summary
    pub fn summary_header(&self) -> String {
        if self.is_success() {
            format!("SUCCESS: {} test(s) passed", self.passed)
        } else {
            format!(
                "FAILURE: {} test(s) passed, {} test(s) failed:",
                self.passed,
                self.failures.len()
            )
        }
    }

    /// One line per failure, naming the file and its retained directory
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| {
                format!(
                    "  - {} (output in {})",
                    f.source_path.display(),
                    f.retained_dir.display()
                )
            })
            .collect()
    }
}

/// Print the final summary to stdout
pub fn print_summary(report: &SuiteReport) {
    if report.is_success() {
        println!("{}", report.summary_header().green().bold());
        return;
    }

    println!();
    println!("{}", report.summary_header().red().bold());
    for line in report.failure_lines() {
        println!("{}", line);
    }
}

/// Expand one command-line argument into test files
///
/// A directory is walked recursively for files whose name ends in `suffix`,
/// skipping hidden entries, sorted component-wise by path. Entries below the
/// root that cannot be read are skipped with a warning. Anything else is
/// returned as-is.
pub fn discover(path: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                tracing::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                return Err(Error::Discovery {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(suffix) {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Everything the orchestrator needs besides the process runner
pub struct SuiteSettings {
    /// Fixture compiler program
    pub compiler: PathBuf,
    /// Test file suffix used during directory discovery
    pub suffix: String,
    /// Parent of the per-case working directories
    pub workdir_root: PathBuf,
    pub workdir_prefix: String,
    /// Directory SUT paths are resolved against
    pub harness_dir: PathBuf,
    pub locator: Box<dyn CommandLocator + Send + Sync>,
}

impl SuiteSettings {
    pub fn from_config(config: &Config, harness_dir: PathBuf) -> Self {
        Self {
            compiler: config.fixtures.compiler.clone(),
            suffix: config.discovery.suffix.clone(),
            workdir_root: config.workdir.root.clone(),
            workdir_prefix: config.workdir.prefix.clone(),
            harness_dir,
            locator: locator_for(config.grammar.locator),
        }
    }
}

/// Sequential test suite driver
pub struct Suite<R> {
    runner: R,
    settings: SuiteSettings,
}

impl<R: ProcessRunner> Suite<R> {
    pub fn new(runner: R, settings: SuiteSettings) -> Self {
        Self { runner, settings }
    }

    /// Run every test file named by `args`
    ///
    /// Malformed test files and I/O failures abort the run with `Err`;
    /// failing cases are recorded in the report.
    pub async fn run(&self, args: &[PathBuf]) -> Result<SuiteReport> {
        if args.is_empty() {
            return Err(Error::Usage);
        }

        let mut report = SuiteReport::default();
        for arg in args {
            for file in discover(arg, &self.settings.suffix)? {
                self.run_file(&file, &mut report).await?;
            }
        }
        Ok(report)
    }

    /// Run one test file and record its outcome
    pub async fn run_file(&self, path: &Path, report: &mut SuiteReport) -> Result<RunOutcome> {
        println!("{}", path.display());

        let case = TestCase::load(path, &*self.settings.locator)?;
        let source = std::fs::canonicalize(path).map_err(|e| Error::file_read(path, &e))?;
        let workdir =
            WorkingDirectory::allocate(&self.settings.workdir_root, &self.settings.workdir_prefix)?;

        tracing::debug!(
            "Running {} ({} fixtures) in {}",
            path.display(),
            case.fixture_count,
            workdir.path().display()
        );

        let outcome = match self.execute(&case, &source, workdir.path()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("{} aborted: {}", path.display(), e);
                RunOutcome::HarnessError {
                    reason: e.to_string(),
                }
            }
        };

        if outcome.is_pass() {
            workdir.dispose()?;
            report.passed += 1;
            return Ok(outcome);
        }

        let retained_dir = workdir.retain();
        report_failure(path, &retained_dir, &outcome);
        report.failures.push(Failure {
            source_path: path.to_path_buf(),
            retained_dir,
            tag: outcome.tag(),
        });
        Ok(outcome)
    }

    /// Provision, invoke and verify one parsed case inside `working_dir`
    async fn execute(
        &self,
        case: &TestCase,
        source: &Path,
        working_dir: &Path,
    ) -> Result<RunOutcome> {
        let provisioning = provision_fixtures(
            &self.runner,
            &self.settings.compiler,
            source,
            case.fixture_count,
            working_dir,
        )
        .await?;
        if let Provisioning::Failed { index, reason } = provisioning {
            return Ok(RunOutcome::ProvisioningError { index, reason });
        }

        let status = invoke_sut(
            &self.runner,
            &case.invocation_template,
            &self.settings.harness_dir,
            working_dir,
        )
        .await?;
        match status {
            ProcessStatus::TimedOut(limit) => return Ok(RunOutcome::TimedOut { limit }),
            status if !status.success() => return Ok(RunOutcome::Crashed { status }),
            _ => {}
        }

        Ok(match verify_output(working_dir, &case.expected_output)? {
            Verdict::Match => RunOutcome::Pass,
            Verdict::Mismatch { diff } => RunOutcome::Mismatch { diff },
        })
    }
}

/// Print the per-case failure block
fn report_failure(path: &Path, retained_dir: &Path, outcome: &RunOutcome) {
    let tag = outcome.tag().red().bold();

    match outcome {
        RunOutcome::Mismatch { diff } => print_diff(diff),
        RunOutcome::ProvisioningError { index, reason } => {
            println!("fixture {}: {}", index, reason.dimmed());
        }
        RunOutcome::Crashed { status } => println!("{}", status.to_string().dimmed()),
        RunOutcome::TimedOut { limit } => {
            println!("{}", format!("no exit after {}s", limit.as_secs()).dimmed());
        }
        RunOutcome::HarnessError { reason } => println!("{}", reason.dimmed()),
        RunOutcome::Pass => {}
    }

    println!("{}: {}", tag, path.display());
    println!("{}: output in {}", tag, retained_dir.display());
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            println!("{}", line.bold());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
}
