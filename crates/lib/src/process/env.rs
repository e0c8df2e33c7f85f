//! Per-invocation environment overlays.
//!
//! An [`EnvOverlay`] holds the handful of variables one external invocation
//! needs changed. The child inherits the ambient environment and the overlay
//! is applied on top of it; the ambient environment of this process is never
//! written to.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use tokio::process::Command;

use super::ProcessError;

const PATH_VAR: &str = "PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
  vars: BTreeMap<String, OsString>,
}

impl EnvOverlay {
  /// An overlay that changes nothing.
  pub fn new() -> Self {
    Self::default()
  }

  /// Override `key` with `value`.
  pub fn set(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
    self.vars.insert(key.into(), value.into());
    self
  }

  /// Prepend `dir` to the search path inherited from the ambient environment.
  ///
  /// The ambient `PATH` is read once, here, and copied into the overlay.
  pub fn prepend_path(self, dir: &Path) -> Result<Self, ProcessError> {
    let ambient = std::env::var_os(PATH_VAR);
    self.prepend_path_to(dir, ambient.as_deref())
  }

  /// Prepend `dir` to an explicit base search path.
  pub fn prepend_path_to(self, dir: &Path, base: Option<&OsStr>) -> Result<Self, ProcessError> {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(base) = base.filter(|b| !b.is_empty()) {
      entries.extend(std::env::split_paths(base));
    }
    let joined = std::env::join_paths(entries)?;
    Ok(self.set(PATH_VAR, joined))
  }

  pub fn get(&self, key: &str) -> Option<&OsStr> {
    self.vars.get(key).map(OsString::as_os_str)
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
  }

  pub(crate) fn apply(&self, command: &mut Command) {
    for (key, value) in &self.vars {
      command.env(key, value);
    }
  }
}
