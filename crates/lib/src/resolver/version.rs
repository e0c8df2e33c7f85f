//! Version range specifiers in interval notation, e.g. `[1.2.5,1.2.5]` or `[8.4,9)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionRangeError {
  #[error("version range '{0}' must start with '[' or '('")]
  MissingOpen(String),

  #[error("version range '{0}' must end with ']' or ')'")]
  MissingClose(String),

  #[error("version range '{0}' must have exactly two bounds separated by ','")]
  BoundCount(String),

  #[error("invalid version '{bound}' in range '{range}'")]
  InvalidBound { range: String, bound: String },
}

/// An interval of versions understood by the package tool's `path` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
  low_inclusive: bool,
  low: String,
  high: String,
  high_inclusive: bool,
}

impl VersionRange {
  /// Build a range from known-good parts without validation.
  pub(crate) fn from_parts(low_inclusive: bool, low: &str, high: &str, high_inclusive: bool) -> Self {
    Self {
      low_inclusive,
      low: low.to_string(),
      high: high.to_string(),
      high_inclusive,
    }
  }

  /// The range matching exactly `version`, rendered as `[v,v]`.
  pub fn exact(version: &str) -> Result<Self, VersionRangeError> {
    format!("[{},{}]", version, version).parse()
  }

  pub fn low(&self) -> &str {
    &self.low
  }

  pub fn high(&self) -> &str {
    &self.high
  }
}

fn is_version(s: &str) -> bool {
  !s.is_empty()
    && !s.starts_with('.')
    && !s.ends_with('.')
    && !s.contains("..")
    && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

impl FromStr for VersionRange {
  type Err = VersionRangeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let low_inclusive = match trimmed.chars().next() {
      Some('[') => true,
      Some('(') => false,
      _ => return Err(VersionRangeError::MissingOpen(s.to_string())),
    };
    let high_inclusive = match trimmed.chars().last() {
      Some(']') if trimmed.len() > 1 => true,
      Some(')') if trimmed.len() > 1 => false,
      _ => return Err(VersionRangeError::MissingClose(s.to_string())),
    };

    let inner = &trimmed[1..trimmed.len() - 1];
    let bounds: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [low, high] = bounds.as_slice() else {
      return Err(VersionRangeError::BoundCount(s.to_string()));
    };

    for bound in [low, high] {
      if !is_version(bound) {
        return Err(VersionRangeError::InvalidBound {
          range: s.to_string(),
          bound: bound.to_string(),
        });
      }
    }

    Ok(Self {
      low_inclusive,
      low: low.to_string(),
      high: high.to_string(),
      high_inclusive,
    })
  }
}

impl TryFrom<String> for VersionRange {
  type Error = VersionRangeError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<VersionRange> for String {
  fn from(range: VersionRange) -> Self {
    range.to_string()
  }
}

impl fmt::Display for VersionRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}{},{}{}",
      if self.low_inclusive { '[' } else { '(' },
      self.low,
      self.high,
      if self.high_inclusive { ']' } else { ')' }
    )
  }
}
