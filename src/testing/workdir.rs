//! Per-case working directories
//!
//! Fixtures are named by bare index ("1", "2", ...), so every case gets a
//! directory of its own. The directory is removed when the case passes and
//! kept for inspection otherwise.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};

use crate::common::{Error, Result};

/// File that receives the SUT's stdout
pub const ACTUAL_FILE: &str = "actual";

/// File the expected output is written to before comparison
pub const EXPECTED_FILE: &str = "expected";

/// File holding the rendered diff of a mismatch
pub const DIFF_FILE: &str = "diff";

/// An isolated, uniquely named directory owned by one case run
#[derive(Debug)]
pub struct WorkingDirectory {
    dir: TempDir,
}

impl WorkingDirectory {
    /// Create a fresh directory under `root` whose name starts with `prefix`
    pub fn allocate(root: &Path, prefix: &str) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| Error::file_write(root, &e))?;
        let dir = Builder::new()
            .prefix(prefix)
            .tempdir_in(root)
            .map_err(|e| Error::file_write(root, &e))?;
        tracing::trace!("Allocated working directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the directory and everything in it
    pub fn dispose(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| Error::file_write(&path, &e))
    }

    /// Keep the directory on disk and return its path
    pub fn retain(self) -> PathBuf {
        self.dir.keep()
    }
}
