//! External process execution.
//!
//! Every external tool the pipeline touches (package tool, qmake, make, the
//! installer packager) is launched through a [`CommandRunner`]. Invocations are
//! plain values so the exact program, arguments, working directory and
//! environment overlay of each call can be inspected in isolation.
//!
//! A non-zero exit status is not an error at this layer. Callers decide what an
//! exit code means.

mod env;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

pub use env::EnvOverlay;

/// Errors raised while launching a process or reading its output.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program path is empty or otherwise unusable.
  #[error("invalid program path: '{0}'")]
  InvalidProgram(PathBuf),

  /// The OS refused to start the process.
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Captured output is not valid UTF-8.
  #[error("output of '{program}' is not valid UTF-8: {source}")]
  Decode {
    program: PathBuf,
    #[source]
    source: std::string::FromUtf8Error,
  },

  /// A search path entry could not be joined.
  #[error("invalid search path entry: {0}")]
  JoinPaths(#[from] std::env::JoinPathsError),
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitOutcome {
  /// Exit code, or `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl ExitOutcome {
  pub fn from_code(code: i32) -> Self {
    Self { code: Some(code) }
  }

  pub fn success(self) -> bool {
    self.code == Some(0)
  }
}

impl From<std::process::ExitStatus> for ExitOutcome {
  fn from(status: std::process::ExitStatus) -> Self {
    Self { code: status.code() }
  }
}

impl fmt::Display for ExitOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "exit code {}", code),
      None => write!(f, "terminated by signal"),
    }
  }
}

/// One external command: program, arguments, working directory and overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub env: EnvOverlay,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: EnvOverlay::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, overlay: EnvOverlay) -> Self {
    self.env = overlay;
    self
  }

  /// File name of the program without directory or extension.
  pub fn program_stem(&self) -> String {
    self
      .program
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default()
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Launches invocations and waits for them to finish.
///
/// Both operations block the calling step until the child exits; nothing is
/// streamed back to the caller.
pub trait CommandRunner {
  /// Run with inherited stdio and return how the process ended.
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<ExitOutcome, ProcessError>>;

  /// Run and return the whitespace-trimmed standard output.
  fn capture_output_line(&self, invocation: &Invocation) -> impl Future<Output = Result<String, ProcessError>>;
}

/// [`CommandRunner`] that spawns real OS processes.
///
/// Children inherit stdin and stderr. Their stdout is inherited too unless
/// [`SystemRunner::child_stdout_to_stderr`] is set, which keeps this process's
/// own stdout free for machine-readable output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
  stdout_to_stderr: bool,
}

impl SystemRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Send the stdout of children started by `run` to this process's stderr.
  pub fn child_stdout_to_stderr(mut self, enabled: bool) -> Self {
    self.stdout_to_stderr = enabled;
    self
  }

  fn command(invocation: &Invocation) -> Result<Command, ProcessError> {
    if invocation.program.as_os_str().is_empty() {
      return Err(ProcessError::InvalidProgram(invocation.program.clone()));
    }

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args);
    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }
    invocation.env.apply(&mut command);
    Ok(command)
  }

  fn spawn_error(program: &Path) -> impl FnOnce(std::io::Error) -> ProcessError + '_ {
    move |source| ProcessError::Spawn {
      program: program.to_path_buf(),
      source,
    }
  }
}

impl CommandRunner for SystemRunner {
  async fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, ProcessError> {
    info!(cmd = %invocation, cwd = ?invocation.cwd, "executing command");

    let mut command = Self::command(invocation)?;
    if self.stdout_to_stderr {
      command.stdout(std::io::stderr());
    }
    let status = command
      .status()
      .await
      .map_err(Self::spawn_error(&invocation.program))?;

    let outcome = ExitOutcome::from(status);
    debug!(cmd = %invocation, code = ?outcome.code, "command exited");
    Ok(outcome)
  }

  async fn capture_output_line(&self, invocation: &Invocation) -> Result<String, ProcessError> {
    debug!(cmd = %invocation, "capturing command output");

    let mut command = Self::command(invocation)?;
    command.stdin(Stdio::null());
    let output = command
      .output()
      .await
      .map_err(Self::spawn_error(&invocation.program))?;

    if !output.stderr.is_empty() {
      debug!(stderr = %String::from_utf8_lossy(&output.stderr), "command stderr");
    }

    let stdout = String::from_utf8(output.stdout).map_err(|source| ProcessError::Decode {
      program: invocation.program.clone(),
      source,
    })?;

    Ok(stdout.trim().to_string())
  }
}
