//! Staleness check between a source artifact and the artifact derived from it.

use std::io;
use std::path::Path;

/// Returns `true` if `dest` has to be re-created from `source`.
///
/// - If `source` is missing, `dest` is considered up to date whenever it exists.
/// - If `source` exists, `dest` is stale when it is missing or when `source` was
///   modified at the same time or later than `dest`.
///
/// Equal modification times count as stale. A path whose existence cannot be
/// determined is an error, not "missing".
pub fn needs_update(source: &Path, dest: &Path) -> io::Result<bool> {
  let dest_exists = dest.try_exists()?;
  if !source.try_exists()? {
    return Ok(!dest_exists);
  }
  if !dest_exists {
    return Ok(true);
  }

  let source_mtime = source.metadata()?.modified()?;
  let dest_mtime = dest.metadata()?.modified()?;
  Ok(source_mtime >= dest_mtime)
}
