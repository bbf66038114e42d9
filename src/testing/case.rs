//! Test case files
//!
//! A test case file is a positional mini-grammar:
//!
//! ```text
//! --- !ELF            <- YAML documents, one fixture each
//! FileHeader: ...
//!
//! $ ./bloaty 1 -d sections      <- the invocation line
//!     FILE SIZE   ...           <- expected stdout, verbatim
//! ```
//!
//! No YAML validation happens here: the fixture count is simply the number
//! of document separator lines, and each document is handed to the fixture
//! compiler by position.

use std::path::{Path, PathBuf};

use crate::common::config::LocatorKind;
use crate::common::{Error, Result};

/// Marker that opens a YAML document (`---` or `--- !ELF`)
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Marker that closes a YAML document
pub const DOCUMENT_END: &str = "...";

/// Marker that starts the invocation line
pub const COMMAND_MARKER: char = '$';

/// One parsed test case. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// File the case was parsed from
    pub source_path: PathBuf,
    /// Number of fixtures to provision (named "1".."N")
    pub fixture_count: usize,
    /// Invocation line with the command marker stripped
    pub invocation_template: String,
    /// Expected stdout, always terminated by exactly one appended newline
    pub expected_output: String,
}

/// Finds the invocation line among the lines of a test file
pub trait CommandLocator {
    /// Return the index of the invocation line, or a reason why there is none
    fn locate(&self, lines: &[&str]) -> std::result::Result<usize, String>;
}

/// Top-down scan: the first line that starts with the command marker
///
/// Blank lines and every other line before it (the YAML documents) are
/// skipped. This relies on no YAML line starting with `$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanLocator;

impl CommandLocator for ScanLocator {
    fn locate(&self, lines: &[&str]) -> std::result::Result<usize, String> {
        lines
            .iter()
            .position(|line| line.starts_with(COMMAND_MARKER))
            .ok_or_else(|| format!("no line starting with '{}' found", COMMAND_MARKER))
    }
}

/// Stricter grammar: the invocation line is the first non-blank line after
/// the last `...` document-end line.
///
/// Files without any document-end line fall back to [`ScanLocator`], so
/// existing test files parse identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedLocator;

impl CommandLocator for DelimitedLocator {
    fn locate(&self, lines: &[&str]) -> std::result::Result<usize, String> {
        let Some(end) = lines.iter().rposition(|line| line.trim_end() == DOCUMENT_END) else {
            return ScanLocator.locate(lines);
        };

        let candidate = lines
            .iter()
            .enumerate()
            .skip(end + 1)
            .find(|(_, line)| !line.trim().is_empty());

        match candidate {
            Some((index, line)) if line.starts_with(COMMAND_MARKER) => Ok(index),
            Some((index, line)) => Err(format!(
                "line {} after '{}' must start with '{}', found '{}'",
                index + 1,
                DOCUMENT_END,
                COMMAND_MARKER,
                line
            )),
            None => Err(format!(
                "no command line after the last '{}' line",
                DOCUMENT_END
            )),
        }
    }
}

/// Build the locator selected in the configuration
pub fn locator_for(kind: LocatorKind) -> Box<dyn CommandLocator + Send + Sync> {
    match kind {
        LocatorKind::Scan => Box::new(ScanLocator),
        LocatorKind::Delimited => Box::new(DelimitedLocator),
    }
}

/// Count document separator lines over the whole file
pub fn count_fixtures(content: &str) -> usize {
    content
        .lines()
        .filter(|line| line.starts_with(DOCUMENT_SEPARATOR))
        .count()
}

impl TestCase {
    /// Parse the text of one test file
    pub fn parse(
        source_path: &Path,
        content: &str,
        locator: &dyn CommandLocator,
    ) -> Result<Self> {
        if content.is_empty() {
            return Err(Error::format(source_path, "file is empty"));
        }

        let fixture_count = count_fixtures(content);
        let lines: Vec<&str> = content.lines().collect();

        let command_index = locator
            .locate(&lines)
            .map_err(|reason| Error::format(source_path, reason))?;

        let command_line = lines[command_index];
        let invocation_template = command_line
            .strip_prefix(COMMAND_MARKER)
            .unwrap_or(command_line)
            .trim()
            .to_string();
        if invocation_template.is_empty() {
            return Err(Error::format(
                source_path,
                format!("line {} has no command after '{}'", command_index + 1, COMMAND_MARKER),
            ));
        }

        let mut expected_output = lines[command_index + 1..].join("\n");
        expected_output.push('\n');

        Ok(Self {
            source_path: source_path.to_path_buf(),
            fixture_count,
            invocation_template,
            expected_output,
        })
    }

    /// Read and parse a test file from disk
    pub fn load(source_path: &Path, locator: &dyn CommandLocator) -> Result<Self> {
        let content =
            std::fs::read_to_string(source_path).map_err(|e| Error::file_read(source_path, &e))?;
        Self::parse(source_path, &content, locator)
    }

    /// Fixture indices, 1-based and contiguous
    pub fn fixture_indices(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.fixture_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FIXTURES: &str = "--- !ELF
FileHeader:
  Class: ELFCLASS64
--- !ELF
FileHeader:
  Class: ELFCLASS32

$ ./bloaty 1 -- 2
    FILE SIZE        VM SIZE
 --------------  --------------
  100.0%     64   100.0%     64    TOTAL";

    fn parse(content: &str) -> Result<TestCase> {
        TestCase::parse(Path::new("case.test"), content, &ScanLocator)
    }

    #[test]
    fn test_parse_two_fixtures() {
        let case = parse(TWO_FIXTURES).unwrap();
        assert_eq!(case.fixture_count, 2);
        assert_eq!(case.invocation_template, "./bloaty 1 -- 2");
        assert_eq!(
            case.expected_output,
            "    FILE SIZE        VM SIZE\n --------------  --------------\n  100.0%     64   100.0%     64    TOTAL\n"
        );
        assert_eq!(case.fixture_indices().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_parse_no_fixtures() {
        let case = parse("$ echo hello\nhello\n").unwrap();
        assert_eq!(case.fixture_count, 0);
        assert_eq!(case.invocation_template, "echo hello");
        assert_eq!(case.expected_output, "hello\n");
        assert!(case.fixture_indices().next().is_none());
    }

    #[test]
    fn test_empty_remainder_is_single_newline() {
        let case = parse("\n\n$ ./bloaty --help").unwrap();
        assert_eq!(case.expected_output, "\n");
    }

    #[test]
    fn test_trailing_blank_lines_are_kept() {
        let case = parse("$ ./sut\nline\n\n").unwrap();
        assert_eq!(case.expected_output, "line\n\n");
    }

    #[test]
    fn test_marker_whitespace_stripped() {
        let case = parse("$   ./bloaty  1   -n 0  \nout").unwrap();
        assert_eq!(case.invocation_template, "./bloaty  1   -n 0");
    }

    #[test]
    fn test_marker_lines_after_command_are_output() {
        let case = parse("$ ./sut\n$ not a command\n").unwrap();
        assert_eq!(case.invocation_template, "./sut");
        assert_eq!(case.expected_output, "$ not a command\n");
    }

    #[test]
    fn test_separator_lines_in_output_are_counted() {
        let case = parse("$ ./sut\n---\n").unwrap();
        assert_eq!(case.fixture_count, 1);
    }

    #[test]
    fn test_indented_separator_not_counted() {
        assert_eq!(count_fixtures("--- !ELF\n  ---\nx: ---\n---\n"), 2);
    }

    #[test]
    fn test_empty_file_is_format_error() {
        assert!(matches!(parse(""), Err(Error::Format { .. })));
    }

    #[test]
    fn test_missing_command_is_format_error() {
        let err = parse("--- !ELF\nFileHeader: {}\n").unwrap_err();
        match err {
            Error::Format { path, reason } => {
                assert_eq!(path, "case.test");
                assert!(reason.contains("'$'"));
            }
            other => panic!("Expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_marker_is_format_error() {
        assert!(matches!(parse("$\nout\n"), Err(Error::Format { .. })));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(TWO_FIXTURES).unwrap(), parse(TWO_FIXTURES).unwrap());
    }

    #[test]
    fn test_delimited_falls_back_to_scan() {
        let scanned = parse(TWO_FIXTURES).unwrap();
        let delimited =
            TestCase::parse(Path::new("case.test"), TWO_FIXTURES, &DelimitedLocator).unwrap();
        assert_eq!(scanned, delimited);
    }

    #[test]
    fn test_delimited_finds_command_after_document_end() {
        let content = "--- !ELF\nFileHeader:\n  Comment: $ not a command\n...\n\n$ ./bloaty 1\nout\n";
        let case = TestCase::parse(Path::new("d.test"), content, &DelimitedLocator).unwrap();
        assert_eq!(case.fixture_count, 1);
        assert_eq!(case.invocation_template, "./bloaty 1");
        assert_eq!(case.expected_output, "out\n");
    }

    #[test]
    fn test_delimited_rejects_text_before_command() {
        let content = "--- !ELF\n...\nstray\n$ ./bloaty 1\n";
        let err = TestCase::parse(Path::new("d.test"), content, &DelimitedLocator).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_delimited_rejects_missing_command() {
        let content = "--- !ELF\n...\n\n";
        let err = TestCase::parse(Path::new("d.test"), content, &DelimitedLocator).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn test_locator_for_kind() {
        let lines = ["--- !ELF", "...", "$ ./sut"];
        assert_eq!(locator_for(LocatorKind::Scan).locate(&lines), Ok(2));
        assert_eq!(locator_for(LocatorKind::Delimited).locate(&lines), Ok(2));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.test");
        std::fs::write(&path, "$ echo hi\nhi").unwrap();
        let case = TestCase::load(&path, &ScanLocator).unwrap();
        assert_eq!(case.source_path, path);
        assert_eq!(case.expected_output, "hi\n");
    }

    #[test]
    fn test_load_missing_file() {
        let err = TestCase::load(Path::new("/nonexistent/x.test"), &ScanLocator).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
