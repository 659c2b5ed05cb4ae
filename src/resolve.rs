//! Dependency discovery via the system dynamic loader.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// One entry of a binary's dynamic dependency list.
///
/// `path` is the concrete file the loader would map for `name`, or
/// `None` for entries with no backing file: virtual objects such as
/// `linux-vdso.so.1`, and libraries the loader could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Requested name as recorded in the binary's dynamic section.
    pub name: String,
    /// Resolved absolute path, if the loader found one.
    pub path: Option<PathBuf>,
}

/// Source of dependency listings for a binary.
///
/// The production implementation is [`Ldd`]; tests substitute a fixed
/// listing so they need neither a real loader nor real binaries.
pub trait DependencyLister {
    /// List the dependencies of `binary` in loader resolution order.
    fn list_dependencies(&self, binary: &Path) -> Result<Vec<DependencyRecord>>;
}

/// Lists dependencies by running the system `ldd`.
///
/// `ldd` asks the dynamic loader itself to trace the binary, so the
/// resolved paths reflect rpath/runpath, default search paths and
/// preloads exactly as they would apply at run time.
pub struct Ldd;

impl DependencyLister for Ldd {
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - `ldd` is not installed
    /// - `ldd` rejects the file (e.g. not a dynamic executable for this host)
    fn list_dependencies(&self, binary: &Path) -> Result<Vec<DependencyRecord>> {
        // Check file exists first for a clear error message
        if !binary.exists() {
            bail!("File does not exist: {}", binary.display());
        }

        let output = Command::new("ldd")
            .arg(binary)
            .output()
            .context("ldd command not found")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("ldd failed on {}: {}", binary.display(), stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ldd_output(&stdout)
    }
}

/// Parse `ldd` output into dependency records, preserving line order.
///
/// Example ldd output:
/// ```text
///         linux-vdso.so.1 (0x00007ffc8a5f2000)
///         libc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f06f0a94000)
///         /lib64/ld-linux-x86-64.so.2 (0x00007f06f0c8e000)
/// ```
///
/// Three line shapes matter: `name => path` is a resolved library,
/// `name => not found` is an unresolved one, and a lone token is the
/// vDSO (no backing file) unless it is an absolute path, in which case
/// it is the program interpreter and resolves to itself.
#[must_use = "dependency records should be processed"]
pub fn parse_ldd_output(output: &str) -> Result<Vec<DependencyRecord>> {
    let mut records = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line == "statically linked" {
            continue;
        }

        if let Some((name, rest)) = line.split_once("=>") {
            let rest = rest.trim();
            let path = if rest.starts_with("not found") {
                None
            } else {
                rest.split_whitespace().next().map(PathBuf::from)
            };
            records.push(DependencyRecord {
                name: name.trim().to_string(),
                path,
            });
        } else if let Some(token) = line.split_whitespace().next() {
            let path = token.starts_with('/').then(|| PathBuf::from(token));
            records.push(DependencyRecord {
                name: token.to_string(),
                path,
            });
        }
    }

    Ok(records)
}
