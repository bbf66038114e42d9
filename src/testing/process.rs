//! Child process execution
//!
//! Every external program the harness starts (fixture compiler, SUT) goes
//! through [`ProcessRunner`], so the pipeline can be driven by an in-process
//! fake in unit tests.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command as TokioCommand};

use crate::common::{Error, Result};

/// What to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// Run a program directly with an argument vector
    Exec { program: PathBuf, args: Vec<OsString> },
    /// Run a command line through `sh -c`
    Shell(String),
}

/// One child process request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: Program,
    /// File name, relative to the working directory, that receives stdout
    pub stdout_file: String,
}

impl Invocation {
    /// Run `program args...` with stdout redirected to `stdout_file`
    pub fn exec(
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<OsString>>,
        stdout_file: impl Into<String>,
    ) -> Self {
        Self {
            program: Program::Exec {
                program: program.into(),
                args: args.into_iter().map(Into::into).collect(),
            },
            stdout_file: stdout_file.into(),
        }
    }

    /// Run a shell command line with stdout redirected to `stdout_file`
    pub fn shell(line: impl Into<String>, stdout_file: impl Into<String>) -> Self {
        Self {
            program: Program::Shell(line.into()),
            stdout_file: stdout_file.into(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.program {
            Program::Exec { program, args } => {
                write!(f, "{}", program.display())?;
                for arg in args {
                    write!(f, " {}", arg.to_string_lossy())?;
                }
            }
            Program::Shell(line) => write!(f, "{line}")?,
        }
        write!(f, " > {}", self.stdout_file)
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Exited normally with this code
    Exited(i32),
    /// Terminated by a signal
    Signaled,
    /// Killed after exceeding the wall-clock limit
    TimedOut(Duration),
}

impl ProcessStatus {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled => write!(f, "killed by signal"),
            Self::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs()),
        }
    }
}

/// Capability to run a child process to completion inside a directory
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` with `working_dir` as its current directory
    ///
    /// Returns `Err` only if the process could not be started at all.
    async fn run(&self, invocation: &Invocation, working_dir: &Path) -> Result<ProcessStatus>;
}

/// Runs real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation, working_dir: &Path) -> Result<ProcessStatus> {
        let stdout_path = working_dir.join(&invocation.stdout_file);
        let stdout = std::fs::File::create(&stdout_path)
            .map_err(|e| Error::file_write(&stdout_path, &e))?;

        let (mut cmd, program_name) = match &invocation.program {
            Program::Exec { program, args } => {
                let mut cmd = TokioCommand::new(program);
                cmd.args(args);
                (cmd, program.display().to_string())
            }
            Program::Shell(line) => {
                let mut cmd = TokioCommand::new("sh");
                cmd.arg("-c").arg(line);
                (cmd, "sh".to_string())
            }
        };

        cmd.current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Own process group, so a timeout also reaches whatever the child started
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        tracing::debug!(cwd = %working_dir.display(), "Running {}", invocation);

        let mut child = cmd.spawn().map_err(|e| Error::spawn(&program_name, &e))?;

        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status?,
                Err(_) => {
                    tracing::warn!("'{}' exceeded {}s, killing it", invocation, limit.as_secs());
                    kill_process_group(&mut child).await;
                    return Ok(ProcessStatus::TimedOut(limit));
                }
            },
            None => child.wait().await?,
        };

        let status = match status.code() {
            Some(code) => ProcessStatus::Exited(code),
            None => ProcessStatus::Signaled,
        };
        tracing::trace!("'{}' finished: {}", invocation, status);
        Ok(status)
    }
}

/// Kill `child` together with every process in its group
async fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // The child leads its group, so the group id is its pid
            let result = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if result != 0 {
                tracing::debug!(
                    "killpg({}) failed: {}",
                    pid,
                    std::io::Error::last_os_error()
                );
            }
        }
    }
    let _ = child.kill().await;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-process stand-in for [`SystemRunner`]

    use super::*;
    use std::sync::Mutex;

    type Behavior = Box<dyn Fn(&Invocation) -> (ProcessStatus, Vec<u8>) + Send + Sync>;

    /// Answers every invocation from a closure and records what was asked
    pub(crate) struct FakeRunner {
        behavior: Behavior,
        calls: Mutex<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub(crate) fn new(
            behavior: impl Fn(&Invocation) -> (ProcessStatus, Vec<u8>) + Send + Sync + 'static,
        ) -> Self {
            Self {
                behavior: Box::new(behavior),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, invocation: &Invocation, working_dir: &Path) -> Result<ProcessStatus> {
            self.calls.lock().unwrap().push(invocation.clone());
            let (status, stdout) = (self.behavior)(invocation);
            std::fs::write(working_dir.join(&invocation.stdout_file), stdout)?;
            Ok(status)
        }
    }
}
