//! Fixture harness - declarative, file-driven tests for binary analysis tools
//!
//! A test file bundles YAML fixtures, one invocation line and the expected
//! stdout. The harness compiles the fixtures, runs the system under test and
//! compares its output byte for byte.

pub mod cli;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{RunOutcome, SuiteReport, TestCase};
