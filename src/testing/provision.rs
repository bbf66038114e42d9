//! Fixture provisioning
//!
//! Each YAML document of a test file is compiled into one binary artifact by
//! the external fixture compiler: `<compiler> <source> --docnum=<i> > <i>`.

use std::path::{Path, PathBuf};

use super::process::{Invocation, ProcessRunner};
use crate::common::{Error, Result};

/// One compiled fixture inside a working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// 1-based document index; also the artifact's file name
    pub index: usize,
    pub artifact_path: PathBuf,
}

/// Result of provisioning all fixtures of one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioning {
    /// Every artifact "1".."N" exists
    Ready(Vec<Fixture>),
    /// The compiler failed on `index`; later documents were not attempted
    Failed { index: usize, reason: String },
}

/// Compile documents `1..=count` of `source` into `working_dir`, in order
///
/// `source` must be absolute since the compiler runs inside `working_dir`.
pub async fn provision_fixtures<R: ProcessRunner + ?Sized>(
    runner: &R,
    compiler: &Path,
    source: &Path,
    count: usize,
    working_dir: &Path,
) -> Result<Provisioning> {
    let mut fixtures = Vec::with_capacity(count);

    for index in 1..=count {
        let name = index.to_string();
        let invocation = Invocation::exec(
            compiler,
            [source.as_os_str().to_os_string(), format!("--docnum={index}").into()],
            name.clone(),
        );

        let status = match runner.run(&invocation, working_dir).await {
            Ok(status) => status,
            Err(Error::Spawn { program, error }) => {
                return Ok(Provisioning::Failed {
                    index,
                    reason: format!("could not start '{program}': {error}"),
                });
            }
            Err(e) => return Err(e),
        };

        if !status.success() {
            tracing::debug!("Fixture {} of {} failed: {}", index, source.display(), status);
            return Ok(Provisioning::Failed {
                index,
                reason: format!("fixture compiler {status}"),
            });
        }

        fixtures.push(Fixture {
            index,
            artifact_path: working_dir.join(name),
        });
    }

    Ok(Provisioning::Ready(fixtures))
}
