//! The fixed compiler toolchain installation.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ToolchainConfig;
use crate::process::{EnvOverlay, ProcessError};

/// A toolchain installed at one fixed root.
///
/// There is no search and no version negotiation: either the compiler exists
/// under the configured root or the toolchain is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  config: ToolchainConfig,
}

impl Toolchain {
  pub fn new(config: ToolchainConfig) -> Self {
    Self { config }
  }

  /// Check that the compiler binary exists under the root.
  pub fn validate(&self) -> bool {
    let compiler = self.compiler();
    let found = compiler.is_file();
    if found {
      debug!(compiler = %compiler.display(), "toolchain found");
    } else {
      warn!(root = %self.root().display(), compiler = %compiler.display(), "toolchain not found");
    }
    found
  }

  pub fn root(&self) -> &Path {
    &self.config.root
  }

  pub fn compiler(&self) -> PathBuf {
    self.config.root.join(&self.config.compiler)
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.config.root.join(&self.config.bin_dir)
  }

  pub fn qmake(&self) -> PathBuf {
    self.config.root.join(&self.config.qmake)
  }

  pub fn make(&self) -> PathBuf {
    self.config.root.join(&self.config.make)
  }

  pub fn spec(&self) -> &str {
    &self.config.spec
  }

  /// Overlay putting the toolchain's binaries first on the search path.
  pub fn overlay(&self) -> Result<EnvOverlay, ProcessError> {
    EnvOverlay::new().prepend_path(&self.bin_dir())
  }
}
