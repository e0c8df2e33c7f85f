use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::VersionRange;

/// An external package obtained through the package tool.
///
/// `version` is what gets installed, `versions` is the range used to find the
/// installed copy. `path` stays `None` until a query returned a non-empty path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
  pub id: String,
  pub version: String,
  pub versions: VersionRange,
  #[serde(skip)]
  pub path: Option<PathBuf>,
}

impl Package {
  pub fn new(id: impl Into<String>, version: impl Into<String>, versions: VersionRange) -> Self {
    Self {
      id: id.into(),
      version: version.into(),
      versions,
      path: None,
    }
  }

  pub fn is_resolved(&self) -> bool {
    self.path.is_some()
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }
}
