//! Output verification
//!
//! The SUT's captured stdout must equal the expected output byte for byte.
//! No whitespace or encoding normalization is applied.

use std::path::Path;

use difference::{Changeset, Difference};

use super::workdir::{ACTUAL_FILE, DIFF_FILE, EXPECTED_FILE};
use crate::common::{Error, Result};

/// Outcome of comparing actual against expected output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match,
    /// Outputs differ; `diff` is also written to the working directory
    Mismatch { diff: String },
}

/// Compare `actual` in `working_dir` against `expected_output`
///
/// Leaves `expected` (and `diff` on a mismatch) next to `actual`.
pub fn verify_output(working_dir: &Path, expected_output: &str) -> Result<Verdict> {
    let expected_path = working_dir.join(EXPECTED_FILE);
    std::fs::write(&expected_path, expected_output)
        .map_err(|e| Error::file_write(&expected_path, &e))?;

    let actual_path = working_dir.join(ACTUAL_FILE);
    let actual = std::fs::read(&actual_path).map_err(|e| Error::file_read(&actual_path, &e))?;

    if actual == expected_output.as_bytes() {
        return Ok(Verdict::Match);
    }

    let diff = render_diff(expected_output, &String::from_utf8_lossy(&actual));
    let diff_path = working_dir.join(DIFF_FILE);
    std::fs::write(&diff_path, &diff).map_err(|e| Error::file_write(&diff_path, &e))?;

    Ok(Verdict::Mismatch { diff })
}

/// Render a line diff, `-` for expected and `+` for actual lines
pub fn render_diff(expected: &str, actual: &str) -> String {
    let mut out = format!("--- {EXPECTED_FILE}\n+++ {ACTUAL_FILE}\n");
    let changeset = Changeset::new(expected, actual, "\n");

    let mut changed = false;
    for diff in &changeset.diffs {
        let (prefix, text) = match diff {
            Difference::Same(text) => (' ', text),
            Difference::Rem(text) => {
                changed = true;
                ('-', text)
            }
            Difference::Add(text) => {
                changed = true;
                ('+', text)
            }
        };
        for line in text.split('\n') {
            out.push(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }

    if !changed {
        out.push_str("(outputs differ only in bytes that are not valid UTF-8)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workdir_with_actual(actual: &[u8]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ACTUAL_FILE), actual).unwrap();
        dir
    }

    #[test]
    fn test_identical_output_matches() {
        let dir = workdir_with_actual(b"hello\n");
        assert_eq!(verify_output(dir.path(), "hello\n").unwrap(), Verdict::Match);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(EXPECTED_FILE)).unwrap(),
            "hello\n"
        );
        assert!(!dir.path().join(DIFF_FILE).exists());
    }

    #[test]
    fn test_single_byte_flip_mismatches() {
        let dir = workdir_with_actual(b"  18 TOTAL\n");
        let verdict = verify_output(dir.path(), "  19 TOTAL\n").unwrap();
        let Verdict::Mismatch { diff } = verdict else {
            panic!("Expected Mismatch");
        };
        assert!(diff.contains("-  19 TOTAL"));
        assert!(diff.contains("+  18 TOTAL"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(DIFF_FILE)).unwrap(),
            diff
        );
    }

    #[test]
    fn test_missing_trailing_newline_mismatches() {
        let dir = workdir_with_actual(b"hello");
        assert!(matches!(
            verify_output(dir.path(), "hello\n").unwrap(),
            Verdict::Mismatch { .. }
        ));
    }

    #[test]
    fn test_empty_stdout_against_single_newline() {
        let dir = workdir_with_actual(b"");
        assert!(matches!(
            verify_output(dir.path(), "\n").unwrap(),
            Verdict::Mismatch { .. }
        ));
    }

    #[test]
    fn test_whitespace_is_significant() {
        let dir = workdir_with_actual(b"a  b\n");
        assert!(matches!(
            verify_output(dir.path(), "a b\n").unwrap(),
            Verdict::Mismatch { .. }
        ));
    }

    #[test]
    fn test_invalid_utf8_difference_detected() {
        let dir = workdir_with_actual(b"x\xff\n");
        let verdict = verify_output(dir.path(), "x\u{fffd}\n").unwrap();
        let Verdict::Mismatch { diff } = verdict else {
            panic!("Expected Mismatch");
        };
        assert!(diff.contains("not valid UTF-8"));
    }

    #[test]
    fn test_missing_actual_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            verify_output(dir.path(), "x\n"),
            Err(Error::FileRead { .. })
        ));
    }
}
