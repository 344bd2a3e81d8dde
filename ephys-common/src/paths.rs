//! Root-relative path arithmetic
//!
//! Session directories are stored relative to the configured root data
//! directory so the store stays portable across machines. These helpers
//! convert between the stored relative form and absolute paths, checking
//! existence along the way.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve a manifest path (absolute or root-relative) to an absolute path.
///
/// Relative input requires a configured root. The resolved path must exist.
pub fn resolve_full_path(root: Option<&Path>, input: &Path) -> Result<PathBuf> {
    let full = if input.is_absolute() {
        input.to_path_buf()
    } else {
        let root = root.ok_or_else(|| {
            Error::Config(format!(
                "ephys_root_data_dir is not configured but path is relative: {}",
                input.display()
            ))
        })?;
        root.join(input)
    };

    if !full.exists() {
        return Err(Error::Path(format!(
            "Resolved path does not exist: {}",
            full.display()
        )));
    }

    Ok(full)
}

/// Express `full` relative to `root`.
pub fn relative_path(root: &Path, full: &Path) -> Result<PathBuf> {
    full.strip_prefix(root)
        .map(|p| p.to_path_buf())
        .map_err(|_| {
            Error::Path(format!(
                "{} is not under the root data directory {}",
                full.display(),
                root.display()
            ))
        })
}

/// Render a path with forward slashes regardless of platform.
///
/// The store holds session directories in POSIX form so records written on
/// one platform resolve on another.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
