//! Hard-link placement of a binary and its dependencies under a new root.

use anyhow::{bail, Context, Result};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::paths::map_into_root;
use crate::resolve::{DependencyLister, DependencyRecord, Ldd};

/// Do two paths refer to the same inode on the same device?
fn same_inode(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::metadata(a).with_context(|| format!("Failed to stat {}", a.display()))?;
    let meta_b = fs::metadata(b).with_context(|| format!("Failed to stat {}", b.display()))?;
    Ok(meta_a.dev() == meta_b.dev() && meta_a.ino() == meta_b.ino())
}

/// Hard-link `binary` to `<root>/bin/<basename>`.
///
/// The link always points at the fully resolved file, while the link
/// name keeps the basename the caller asked for, so a symlinked binary
/// (e.g. `/usr/bin/sh` -> `dash`) lands under its familiar name.
///
/// Re-running against a populated root succeeds as long as the target
/// is already a link to the same file. A different file sitting at the
/// target path is a conflict: each container gets exactly one entry
/// point per name, so this is not suppressed the way overlapping
/// library links are.
///
/// # Errors
///
/// Returns an error if:
/// - `binary` does not resolve to a real file (checked before any
///   directory is created under `root`)
/// - the target exists and is a different file than `binary`
/// - the link cannot be created (permissions, cross-device, ...)
pub fn place_entry_point(binary: &Path, root: &Path) -> Result<()> {
    let source = fs::canonicalize(binary)
        .with_context(|| format!("Binary not found: {}", binary.display()))?;
    let name = binary
        .file_name()
        .with_context(|| format!("Binary path has no file name: {}", binary.display()))?;

    let bin_dir = root.join("bin");
    fs::create_dir_all(&bin_dir)
        .with_context(|| format!("Failed to create {}", bin_dir.display()))?;
    let target = bin_dir.join(name);

    println!("Linking {} -> {}", binary.display(), target.display());
    match fs::hard_link(&source, &target) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            if same_inode(&source, &target)? {
                debug!("{} is already linked", target.display());
                Ok(())
            } else {
                bail!(
                    "{} exists and is not linked to {}",
                    target.display(),
                    source.display()
                );
            }
        }
        Err(err) => Err(err).with_context(|| {
            format!("Failed to link {} -> {}", source.display(), target.display())
        }),
    }
}

/// Hard-link one resolved dependency to its mirrored path under `root`.
///
/// Records with no resolved path (the vDSO, libraries the loader could
/// not find) are skipped. A target that already exists counts as done:
/// shared libraries recur across binaries, and re-running against a
/// populated root is the normal way to assemble a container
/// incrementally.
///
/// # Errors
///
/// Returns an error if the resolved path no longer exists, or if the
/// link fails for any reason other than the target already existing.
pub fn place_dependency(record: &DependencyRecord, root: &Path) -> Result<()> {
    let Some(library) = &record.path else {
        debug!("Skipping {} (no backing file)", record.name);
        return Ok(());
    };

    let target = map_into_root(root, library);
    let lib_dir = target
        .parent()
        .with_context(|| format!("Target path has no parent: {}", target.display()))?;
    fs::create_dir_all(lib_dir)
        .with_context(|| format!("Failed to create {}", lib_dir.display()))?;

    println!("Linking {} -> {}", library.display(), target.display());
    let source = fs::canonicalize(library)
        .with_context(|| format!("Library not found: {}", library.display()))?;
    match fs::hard_link(&source, &target) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            debug!("{} is already linked", target.display());
            Ok(())
        }
        Err(err) => Err(err).with_context(|| {
            format!("Failed to link {} -> {}", source.display(), target.display())
        }),
    }
}

/// Build the container tree for `binary` under `root`.
///
/// Places the binary at `<root>/bin/<basename>`, asks `lister` for its
/// dependency list once, then places every resolved dependency at its
/// original absolute path below `root`, in listing order.
///
/// Fails fast: the first error aborts the run and already-created
/// links stay in place. A re-run completes the remaining work.
pub fn materialize_with(lister: &dyn DependencyLister, binary: &Path, root: &Path) -> Result<()> {
    place_entry_point(binary, root)?;

    let records = lister.list_dependencies(binary)?;
    for record in &records {
        place_dependency(record, root)?;
    }
    Ok(())
}

/// [`materialize_with`] using the system loader via [`Ldd`].
pub fn materialize(binary: &Path, root: &Path) -> Result<()> {
    materialize_with(&Ldd, binary, root)
}
