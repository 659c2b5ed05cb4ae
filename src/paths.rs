//! Mapping host paths into the destination root.

use std::path::{Path, PathBuf};

/// Map an absolute host path to its location under `root`.
///
/// The leading separator is stripped so the host layout is reproduced
/// below the root: `/lib/libc.so.6` lands at `<root>/lib/libc.so.6`.
/// Purely structural; callers resolve symlinks before mapping if they
/// need the canonical source.
#[must_use = "mapped destination path should be used"]
pub fn map_into_root(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}
