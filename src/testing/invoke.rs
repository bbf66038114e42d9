//! SUT invocation
//!
//! The first token of the invocation template names the SUT relative to the
//! directory the harness was started from. Everything after it (fixture
//! names, flags, `--` separators) is passed through to the shell untouched.

use std::path::{Path, PathBuf};

use super::process::{Invocation, ProcessRunner, ProcessStatus};
use super::workdir::ACTUAL_FILE;
use crate::common::Result;

/// Rewrite the template's first token into an absolute SUT path
pub fn resolve_command(template: &str, harness_dir: &Path) -> String {
    let template = template.trim_start();
    let split = template
        .find(char::is_whitespace)
        .unwrap_or(template.len());
    let (program, rest) = template.split_at(split);

    let resolved = resolve_program(program, harness_dir);
    format!("{}{}", shell_quote(&resolved.to_string_lossy()), rest)
}

/// Resolve a SUT path against the harness directory
///
/// A bare name that does not exist there (e.g. `echo`) is looked up on PATH.
fn resolve_program(program: &str, harness_dir: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let joined = harness_dir.join(path);
    if joined.exists() || program.contains('/') {
        return joined;
    }

    which::which(program).unwrap_or(joined)
}

/// Quote a word for `sh` unless it only holds safe characters
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Run the SUT inside `working_dir`, stdout captured into `actual`
pub async fn invoke_sut<R: ProcessRunner + ?Sized>(
    runner: &R,
    template: &str,
    harness_dir: &Path,
    working_dir: &Path,
) -> Result<ProcessStatus> {
    let command_line = resolve_command(template, harness_dir);
    tracing::debug!("Invoking SUT: {}", command_line);
    runner
        .run(&Invocation::shell(command_line, ACTUAL_FILE), working_dir)
        .await
}
