use crate::error::Error;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// Find Cargo.toml in the working directory or the specified path.
///
/// An explicit path must resolve to an existing manifest; without one a
/// missing `Cargo.toml` in `cwd` simply means no manifest.
pub fn find_manifest(path: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    let Some(base_path) = path else {
        let manifest_path = cwd.join("Cargo.toml");
        return Ok(manifest_path.is_file().then_some(manifest_path));
    };

    let manifest_path = if base_path.is_file() {
        base_path.to_path_buf()
    } else {
        base_path.join("Cargo.toml")
    };

    if !manifest_path.is_file() {
        return Err(Error::ManifestNotFound(
            manifest_path.display().to_string(),
        ));
    }

    Ok(Some(manifest_path))
}

/// Final component of a directory path, resolving `.` and `..` first
pub fn dir_name(path: &Path) -> Option<String> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
