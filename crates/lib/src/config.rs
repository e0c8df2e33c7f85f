//! Build configuration.
//!
//! Every fixed location the pipeline depends on lives here. Defaults describe
//! the Qt SDK 1.1.1 / MinGW toolchain and the package versions the
//! distribution is built against. A project may override any field with an
//! `npbuild.json` file in its root:
//!
//! ```json
//! {
//!   "toolchain": { "root": "D:/QtSDK-1.1.1" },
//!   "packages": { "zlib": { "id": "net.zlib.ZLibSource", "version": "1.2.5", "versions": "[1.2.5,1.2.5]" } }
//! }
//! ```

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{CONFIG_FILENAME, PACKAGE_TOOL_ENV};
use crate::resolver::{Package, VersionRange};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Fixed toolchain layout. All paths except `root` are relative to `root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
  pub root: PathBuf,
  pub compiler: PathBuf,
  pub bin_dir: PathBuf,
  pub qmake: PathBuf,
  pub make: PathBuf,
  /// qmake `-spec` argument.
  pub spec: String,
}

#[cfg(windows)]
fn default_toolchain_root() -> PathBuf {
  PathBuf::from("C:\\QtSDK-1.1.1")
}

#[cfg(not(windows))]
fn default_toolchain_root() -> PathBuf {
  PathBuf::from("/opt/QtSDK-1.1.1")
}

fn exe(path: &str) -> PathBuf {
  PathBuf::from(format!("{}{}", path, EXE_SUFFIX))
}

impl Default for ToolchainConfig {
  fn default() -> Self {
    Self {
      root: default_toolchain_root(),
      compiler: exe("mingw/bin/gcc"),
      bin_dir: PathBuf::from("mingw/bin"),
      qmake: exe("Desktop/Qt/4.7.3/mingw/bin/qmake"),
      make: exe("mingw/bin/mingw32-make"),
      spec: "win32-g++".to_string(),
    }
  }
}

/// The external packages the pipeline installs and resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesConfig {
  pub zlib: Package,
  pub quazip: Package,
  pub installer: Package,
}

fn package(id: &str, version: &str, high: &str, high_inclusive: bool) -> Package {
  Package::new(id, version, VersionRange::from_parts(true, version, high, high_inclusive))
}

impl Default for PackagesConfig {
  fn default() -> Self {
    Self {
      zlib: package("net.zlib.ZLibSource", "1.2.5", "1.2.5", true),
      quazip: package("net.sourceforge.quazip.QuaZIPSource", "0.4.2", "0.4.2", true),
      installer: package("com.advancedinstaller.AdvancedInstallerFreeware", "8.4", "9", false),
    }
  }
}

impl PackagesConfig {
  /// Every package, in the order they are installed.
  pub fn all(&self) -> [&Package; 3] {
    [&self.zlib, &self.quazip, &self.installer]
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  pub toolchain: ToolchainConfig,
  /// Environment variable holding the package tool root.
  pub package_tool_env: String,
  pub packages: PackagesConfig,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      toolchain: ToolchainConfig::default(),
      package_tool_env: PACKAGE_TOOL_ENV.to_string(),
      packages: PackagesConfig::default(),
    }
  }
}

impl BuildConfig {
  /// Load a config file. Fields missing from the file keep their defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Load `npbuild.json` from `project_root` if present, defaults otherwise.
  pub fn discover(project_root: &Path) -> Result<Self, ConfigError> {
    let path = project_root.join(CONFIG_FILENAME);
    if path.is_file() {
      Self::load(&path)
    } else {
      debug!(root = %project_root.display(), "no config file, using defaults");
      Ok(Self::default())
    }
  }
}
