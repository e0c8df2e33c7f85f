//! Pipeline orchestration.
//!
//! [`Orchestrator::build`] runs the whole pipeline:
//! 1. Validates the toolchain. A missing toolchain stops the run quietly.
//! 2. Locates the package tool. If it is unusable the run stops before any step.
//! 3. Installs every declared package up front.
//! 4. Runs the steps in order. The first failed step aborts the rest.
//!
//! Nothing is retried and nothing produced by an earlier step is rolled back.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::pipeline::Pipeline;
use crate::process::CommandRunner;
use crate::resolver::{Package, PackageResolver};
use crate::step::StepState;
use crate::toolchain::Toolchain;

/// Why a pipeline run did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineFailure {
  /// The toolchain root or its compiler is missing. Fixable by the operator.
  #[error("toolchain not found at {root}")]
  ToolchainMissing { root: PathBuf },

  /// The package tool cannot be used. Nothing was attempted.
  #[error("package tool unavailable: {reason}")]
  ResolverUnavailable { reason: String },

  /// A step failed and the remaining steps were not run.
  #[error("step '{step}' failed: {reason}")]
  StepFailed { step: String, reason: String },
}

impl PipelineFailure {
  /// Whether the run stopped before any step began.
  pub fn is_precondition(&self) -> bool {
    !matches!(self, PipelineFailure::StepFailed { .. })
  }

  /// Whether the run should be reported as an error.
  ///
  /// A missing toolchain is a soft stop: nothing was attempted and the
  /// warning is the whole outcome.
  pub fn is_error(&self) -> bool {
    !matches!(self, PipelineFailure::ToolchainMissing { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
  pub name: String,
  pub state: StepState,
  pub reason: Option<String>,
  #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
  pub elapsed: Duration,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
  /// One record per step in pipeline order, including steps never reached.
  pub steps: Vec<StepRecord>,
  pub failure: Option<PipelineFailure>,
  #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
  pub elapsed: Duration,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl BuildReport {
  fn pending(pipeline: &Pipeline) -> Self {
    Self {
      steps: pipeline
        .steps()
        .iter()
        .map(|step| StepRecord {
          name: step.name.clone(),
          state: StepState::Pending,
          reason: None,
          elapsed: Duration::ZERO,
        })
        .collect(),
      failure: None,
      elapsed: Duration::ZERO,
    }
  }

  pub fn succeeded(&self) -> bool {
    self.failure.is_none()
  }

  /// Steps that ran or were skipped, i.e. that left `Pending`.
  pub fn attempted(&self) -> usize {
    self.steps.iter().filter(|s| s.state != StepState::Pending).count()
  }
}

pub struct Orchestrator<'r, R> {
  runner: &'r R,
  toolchain: Toolchain,
  pipeline: Pipeline,
  package_tool_env: String,
  package_tool_root: Option<OsString>,
}

impl<'r, R: CommandRunner> Orchestrator<'r, R> {
  /// The package tool root is read from `package_tool_env` now.
  pub fn new(runner: &'r R, toolchain: Toolchain, pipeline: Pipeline, package_tool_env: &str) -> Self {
    Self {
      runner,
      toolchain,
      pipeline,
      package_tool_env: package_tool_env.to_string(),
      package_tool_root: std::env::var_os(package_tool_env),
    }
  }

  /// Use `root` as the package tool root instead of the environment.
  pub fn with_package_tool_root(mut self, root: Option<OsString>) -> Self {
    self.package_tool_root = root;
    self
  }

  /// Validate the toolchain, then locate the package tool.
  fn preflight(&self) -> Result<PackageResolver<'r, R>, PipelineFailure> {
    if !self.toolchain.validate() {
      return Err(PipelineFailure::ToolchainMissing {
        root: self.toolchain.root().to_path_buf(),
      });
    }
    PackageResolver::locate(self.runner, &self.package_tool_env, self.package_tool_root.as_deref()).map_err(|e| {
      PipelineFailure::ResolverUnavailable { reason: e.to_string() }
    })
  }

  /// Check the preconditions and look up where each declared package is installed.
  ///
  /// Only `path` queries run. Nothing is installed or built. Packages that
  /// cannot be found are returned unresolved.
  pub async fn inspect(&self) -> Result<Vec<Package>, PipelineFailure> {
    let resolver = self.preflight()?;

    let mut packages = self.pipeline.packages().to_vec();
    for package in &mut packages {
      if let Err(e) = resolver.resolve(package).await {
        warn!(package = %package.id, error = %e, "cannot query package location");
      }
    }
    Ok(packages)
  }

  /// Run the pipeline.
  pub async fn build(&self) -> BuildReport {
    let started = Instant::now();
    let mut report = BuildReport::pending(&self.pipeline);
    let outcome = self.run(&mut report).await;
    report.failure = outcome.err();
    report.elapsed = started.elapsed();

    match &report.failure {
      None => info!(steps = report.steps.len(), elapsed = ?report.elapsed, "build complete"),
      Some(failure @ PipelineFailure::ToolchainMissing { .. }) => warn!(%failure, "build not started"),
      Some(failure) => error!(%failure, "build failed"),
    }
    report
  }

  async fn run(&self, report: &mut BuildReport) -> Result<(), PipelineFailure> {
    let resolver = self.preflight()?;

    for package in self.pipeline.packages() {
      if let Err(e) = resolver.ensure_installed(package).await {
        warn!(package = %package.id, error = %e, "package installation failed, continuing");
      }
    }

    for (step, record) in self.pipeline.steps().iter().zip(report.steps.iter_mut()) {
      record.state = StepState::Running;
      let step_started = Instant::now();

      let result = step.execute(self.runner, &resolver).await;

      record.elapsed = step_started.elapsed();
      record.state = result.state();
      record.reason = result.reason.clone();

      if !result.succeeded {
        return Err(PipelineFailure::StepFailed {
          step: step.name.clone(),
          reason: result.reason.unwrap_or_default(),
        });
      }
    }

    Ok(())
  }
}
