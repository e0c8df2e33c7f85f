//! Build steps.
//!
//! A step produces one artifact. Each step has a completion predicate that may
//! let it be skipped, and an action made of one or more external invocations
//! that run in order. The first invocation that fails ends the step.
//!
//! Steps come in three shapes:
//! - fetch-and-build: resolve a source package, copy it into the build tree, build it
//! - compile: generate the project, then run the build driver
//! - package: resolve the packager and run it against a project descriptor

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::guard::needs_update;
use crate::process::{CommandRunner, Invocation};
use crate::resolver::{Package, PackageResolver};
use crate::util::fs::{copy_file, copy_tree};

/// Decides whether a step can be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
  /// Never complete; the step always runs.
  Always,
  /// Complete when anything exists at the path, even a regular file.
  /// Contents are not inspected.
  DirectoryExists(PathBuf),
  /// Complete when `dest` is newer than `source`.
  UpToDate { source: PathBuf, dest: PathBuf },
}

impl Completion {
  pub fn is_complete(&self) -> io::Result<bool> {
    match self {
      Completion::Always => Ok(false),
      Completion::DirectoryExists(dir) => dir.try_exists(),
      Completion::UpToDate { source, dest } => Ok(!needs_update(source, dest)?),
    }
  }
}

/// A file copied inside the build tree before a fetched package is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCopy {
  pub from: PathBuf,
  pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
  FetchBuild {
    package: Package,
    dest: PathBuf,
    prepare: Vec<FileCopy>,
    commands: Vec<Invocation>,
  },
  Compile {
    configure: Invocation,
    build: Invocation,
  },
  Package {
    tool: Package,
    /// Packager executable, relative to the resolved tool path.
    executable: PathBuf,
    args: Vec<String>,
    cwd: PathBuf,
  },
}

/// Lifecycle of a step within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
  Pending,
  Running,
  Succeeded,
  Skipped,
  Failed,
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
  pub succeeded: bool,
  /// The completion predicate held and nothing was run.
  pub skipped: bool,
  pub reason: Option<String>,
}

impl BuildResult {
  pub fn success() -> Self {
    Self {
      succeeded: true,
      skipped: false,
      reason: None,
    }
  }

  pub fn skipped() -> Self {
    Self {
      succeeded: true,
      skipped: true,
      reason: None,
    }
  }

  pub fn failure(reason: impl Into<String>) -> Self {
    Self {
      succeeded: false,
      skipped: false,
      reason: Some(reason.into()),
    }
  }

  pub fn state(&self) -> StepState {
    match (self.succeeded, self.skipped) {
      (true, true) => StepState::Skipped,
      (true, false) => StepState::Succeeded,
      (false, _) => StepState::Failed,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
  pub name: String,
  pub working_dir: PathBuf,
  pub completion: Completion,
  pub action: StepAction,
}

impl BuildStep {
  /// Packages that must resolve before this step can do anything.
  pub fn packages(&self) -> Vec<&Package> {
    match &self.action {
      StepAction::FetchBuild { package, .. } => vec![package],
      StepAction::Compile { .. } => Vec::new(),
      StepAction::Package { tool, .. } => vec![tool],
    }
  }

  /// Whether the completion predicate already holds.
  pub fn is_complete(&self) -> Result<bool, String> {
    self
      .completion
      .is_complete()
      .map_err(|e| format!("cannot check whether {} is complete: {}", self.name, e))
  }

  /// Run the step to completion.
  pub async fn execute<R: CommandRunner>(&self, runner: &R, resolver: &PackageResolver<'_, R>) -> BuildResult {
    match self.is_complete() {
      Ok(true) => {
        info!(step = %self.name, "already complete, skipping");
        return BuildResult::skipped();
      }
      Ok(false) => {}
      Err(reason) => return BuildResult::failure(reason),
    }

    info!(step = %self.name, dir = %self.working_dir.display(), "running step");

    let result = match &self.action {
      StepAction::FetchBuild {
        package,
        dest,
        prepare,
        commands,
      } => fetch_build(runner, resolver, package, dest, prepare, commands).await,
      StepAction::Compile { configure, build } => run_all(runner, [configure, build]).await,
      StepAction::Package {
        tool,
        executable,
        args,
        cwd,
      } => package_with(runner, resolver, tool, executable, args, cwd).await,
    };

    match &result {
      Ok(()) => {
        info!(step = %self.name, "step succeeded");
        BuildResult::success()
      }
      Err(reason) => {
        error!(step = %self.name, reason = %reason, "step failed");
        BuildResult::failure(reason.clone())
      }
    }
  }
}

async fn resolve<R: CommandRunner>(resolver: &PackageResolver<'_, R>, package: &Package) -> Result<PathBuf, String> {
  match resolver.resolve_path(&package.id, &package.versions).await {
    Ok(Some(path)) => Ok(path),
    Ok(None) => Err(format!("{} {} was not found", package.id, package.versions)),
    Err(e) => Err(format!("cannot resolve {}: {}", package.id, e)),
  }
}

async fn fetch_build<R: CommandRunner>(
  runner: &R,
  resolver: &PackageResolver<'_, R>,
  package: &Package,
  dest: &Path,
  prepare: &[FileCopy],
  commands: &[Invocation],
) -> Result<(), String> {
  let source = resolve(resolver, package).await?;

  for copy in prepare {
    debug!(from = %copy.from.display(), to = %copy.to.display(), "copying file");
    copy_file(&copy.from, &copy.to).map_err(|e| e.to_string())?;
  }

  info!(from = %source.display(), to = %dest.display(), "copying package sources");
  copy_tree(&source, dest).map_err(|e| e.to_string())?;

  run_all(runner, commands).await
}

async fn package_with<R: CommandRunner>(
  runner: &R,
  resolver: &PackageResolver<'_, R>,
  tool: &Package,
  executable: &Path,
  args: &[String],
  cwd: &Path,
) -> Result<(), String> {
  let location = resolve(resolver, tool).await?;
  let invocation = Invocation::new(location.join(executable))
    .args(args.iter().cloned())
    .current_dir(cwd);
  run_all(runner, [&invocation]).await
}

/// Run invocations in order, stopping at the first that does not exit 0.
async fn run_all<'a, R, I>(runner: &R, invocations: I) -> Result<(), String>
where
  R: CommandRunner,
  I: IntoIterator<Item = &'a Invocation>,
{
  for invocation in invocations {
    let outcome = runner
      .run(invocation)
      .await
      .map_err(|e| format!("{}: {}", invocation, e))?;
    if !outcome.success() {
      return Err(format!("{} failed with {}", invocation, outcome));
    }
  }
  Ok(())
}
