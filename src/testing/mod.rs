//! File-driven test harness
//!
//! Each test file carries its own fixtures (YAML documents compiled by an
//! external fixture compiler), one SUT invocation, and the exact stdout the
//! SUT must produce. Failing cases keep their working directory on disk so
//! the fixtures, `actual`, `expected` and `diff` can be inspected.

mod case;
mod invoke;
mod process;
mod provision;
mod suite;
mod verify;
mod workdir;

pub use case::{
    count_fixtures, locator_for, CommandLocator, DelimitedLocator, ScanLocator, TestCase,
    COMMAND_MARKER, DOCUMENT_END, DOCUMENT_SEPARATOR,
};
pub use invoke::{invoke_sut, resolve_command};
pub use process::{Invocation, ProcessRunner, ProcessStatus, Program, SystemRunner};
pub use provision::{provision_fixtures, Fixture, Provisioning};
pub use suite::{
    discover, print_summary, Failure, RunOutcome, Suite, SuiteReport, SuiteSettings,
};
pub use verify::{render_diff, verify_output, Verdict};
pub use workdir::{WorkingDirectory, ACTUAL_FILE, DIFF_FILE, EXPECTED_FILE};
