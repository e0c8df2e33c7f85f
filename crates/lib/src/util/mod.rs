//! Shared utilities.
//!
//! Filesystem helpers used by the build steps, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
