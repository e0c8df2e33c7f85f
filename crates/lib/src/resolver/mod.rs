//! Package resolution through the external package tool.
//!
//! The tool is driven through two subcommands:
//! - `add --package=<id> --version=<v>` installs a package
//! - `path --package=<id> --versions=<range>` prints the install path, or nothing
//!
//! The resolver is located once from a single root directory. When that root is
//! unset or the executable is missing the resolver is never constructed, so no
//! caller can fail lazily on first use.

mod package;
mod version;

use std::env::consts::EXE_SUFFIX;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{ALREADY_INSTALLED_EXIT_CODE, PACKAGE_TOOL_EXE};
use crate::process::{CommandRunner, ExitOutcome, Invocation, ProcessError};

pub use package::Package;
pub use version::{VersionRange, VersionRangeError};

#[derive(Debug, Error)]
pub enum ResolveError {
  /// The variable naming the tool root is unset or blank.
  #[error("package tool not configured: environment variable {var} is not set")]
  NotConfigured { var: String },

  /// The tool root is set but holds no executable.
  #[error("package tool not found at {0}")]
  ToolNotFound(PathBuf),

  /// `add` exited with something other than success or "already installed".
  #[error("installation of {id} {version} failed: {outcome}")]
  InstallFailed {
    id: String,
    version: String,
    outcome: ExitOutcome,
  },

  #[error(transparent)]
  InvalidRange(#[from] VersionRangeError),

  #[error(transparent)]
  Process(#[from] ProcessError),
}

impl ResolveError {
  /// Whether the resolver could not be constructed at all.
  pub fn is_unavailable(&self) -> bool {
    matches!(self, ResolveError::NotConfigured { .. } | ResolveError::ToolNotFound(_))
  }
}

/// Result of a successful `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
  Installed,
  AlreadyInstalled,
}

/// Wrapper around the package tool executable.
#[derive(Debug)]
pub struct PackageResolver<'r, R> {
  runner: &'r R,
  executable: PathBuf,
}

impl<'r, R: CommandRunner> PackageResolver<'r, R> {
  /// Locate the tool from the root directory stored in environment variable `var`.
  pub fn from_env(runner: &'r R, var: &str) -> Result<Self, ResolveError> {
    let root = std::env::var_os(var);
    Self::locate(runner, var, root.as_deref())
  }

  /// Locate the tool under `root`. `var` only names the source in errors.
  pub fn locate(runner: &'r R, var: &str, root: Option<&OsStr>) -> Result<Self, ResolveError> {
    let root = root
      .filter(|r| !r.to_string_lossy().trim().is_empty())
      .ok_or_else(|| ResolveError::NotConfigured { var: var.to_string() })?;

    let executable = Path::new(root).join(format!("{}{}", PACKAGE_TOOL_EXE, EXE_SUFFIX));
    if !executable.is_file() {
      return Err(ResolveError::ToolNotFound(executable));
    }

    debug!(executable = %executable.display(), "located package tool");
    Ok(Self { runner, executable })
  }

  pub fn executable(&self) -> &Path {
    &self.executable
  }

  /// Make sure `package` is installed.
  ///
  /// "Already installed" counts as success. The tool does not say which
  /// version it already has, so an exact-version query follows and a warning
  /// is logged when the requested version cannot be found.
  pub async fn ensure_installed(&self, package: &Package) -> Result<InstallStatus, ResolveError> {
    info!(package = %package.id, version = %package.version, "installing package");

    let invocation = Invocation::new(&self.executable)
      .arg("add")
      .arg(format!("--package={}", package.id))
      .arg(format!("--version={}", package.version));
    let outcome = self.runner.run(&invocation).await?;

    match outcome.code {
      Some(0) => Ok(InstallStatus::Installed),
      Some(ALREADY_INSTALLED_EXIT_CODE) => {
        debug!(package = %package.id, "package already installed");
        self.check_installed_version(package).await;
        Ok(InstallStatus::AlreadyInstalled)
      }
      _ => Err(ResolveError::InstallFailed {
        id: package.id.clone(),
        version: package.version.clone(),
        outcome,
      }),
    }
  }

  async fn check_installed_version(&self, package: &Package) {
    let exact = match VersionRange::exact(&package.version) {
      Ok(range) => range,
      Err(e) => {
        warn!(package = %package.id, version = %package.version, error = %e, "cannot verify installed version");
        return;
      }
    };

    match self.resolve_path(&package.id, &exact).await {
      Ok(Some(_)) => {}
      Ok(None) => warn!(
        package = %package.id,
        version = %package.version,
        "package reported as already installed but requested version was not found"
      ),
      Err(e) => warn!(package = %package.id, error = %e, "cannot verify installed version"),
    }
  }

  /// Query the install path of `id` within `versions`.
  ///
  /// Empty output means the package cannot be resolved and yields `None`.
  pub async fn resolve_path(&self, id: &str, versions: &VersionRange) -> Result<Option<PathBuf>, ResolveError> {
    let invocation = Invocation::new(&self.executable)
      .arg("path")
      .arg(format!("--package={}", id))
      .arg(format!("--versions={}", versions));
    let output = self.runner.capture_output_line(&invocation).await?;

    if output.is_empty() {
      debug!(package = %id, versions = %versions, "package not resolvable");
      return Ok(None);
    }

    debug!(package = %id, path = %output, "resolved package");
    Ok(Some(PathBuf::from(output)))
  }

  /// Resolve `package` and record its path on it.
  pub async fn resolve<'p>(&self, package: &'p mut Package) -> Result<Option<&'p Path>, ResolveError> {
    package.path = self.resolve_path(&package.id, &package.versions).await?;
    Ok(package.path())
  }
}
