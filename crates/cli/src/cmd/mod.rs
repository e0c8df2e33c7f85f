mod build;
mod check;
mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;

use npbuild_lib::config::BuildConfig;
use npbuild_lib::orchestrator::Orchestrator;
use npbuild_lib::pipeline::Pipeline;
use npbuild_lib::process::SystemRunner;
use npbuild_lib::toolchain::Toolchain;

use crate::output::OutputFormat;

pub use build::cmd_build;
pub use check::cmd_check;
pub use plan::cmd_plan;

/// Everything a command needs, resolved from the command line.
pub struct Context {
  pub project: PathBuf,
  pub config: BuildConfig,
  pub format: OutputFormat,
}

impl Context {
  pub fn load(project: PathBuf, config: Option<&Path>, toolchain: Option<PathBuf>, format: OutputFormat) -> Result<Self> {
    let mut config = match config {
      Some(path) => BuildConfig::load(path),
      None => BuildConfig::discover(&project),
    }
    .context("Failed to load config")?;

    if let Some(root) = toolchain {
      config.toolchain.root = root;
    }
    debug!(project = %project.display(), toolchain = %config.toolchain.root.display(), "configuration loaded");

    Ok(Self {
      project,
      config,
      format,
    })
  }

  pub fn toolchain(&self) -> Toolchain {
    Toolchain::new(self.config.toolchain.clone())
  }

  pub fn pipeline(&self) -> Result<Pipeline> {
    Pipeline::npackd(&self.project, &self.config, &self.toolchain()).context("Failed to assemble build steps")
  }

  pub fn orchestrator<'r>(&self, runner: &'r SystemRunner) -> Result<Orchestrator<'r, SystemRunner>> {
    Ok(Orchestrator::new(
      runner,
      self.toolchain(),
      self.pipeline()?,
      &self.config.package_tool_env,
    ))
  }
}
