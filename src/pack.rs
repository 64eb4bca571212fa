//! Directory-to-archive packaging.
//!
//! Every entry below the source root becomes one member of a fresh gzip
//! compressed tar archive, named relative to the root. Traversal is sorted by
//! file name at each level so repeated runs produce the same member order.

use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::{Builder, HeaderMode};
use walkdir::WalkDir;

/// Entry left out of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: &'static str,
}

/// Counts reported after a successful pack
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    /// Member names in archive order, only collected in verbose mode
    pub added: Vec<PathBuf>,
    /// Special files and the archive itself
    pub skipped: Vec<Skipped>,
    /// Uncompressed size of all regular file contents
    pub content_bytes: u64,
    /// Size of the finished archive on disk
    pub archive_bytes: u64,
}

impl PackSummary {
    pub fn members(&self) -> usize {
        self.directories + self.files + self.symlinks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Symlink,
}

impl EntryKind {
    fn of(file_type: fs::FileType) -> Option<Self> {
        if file_type.is_symlink() {
            Some(EntryKind::Symlink)
        } else if file_type.is_dir() {
            Some(EntryKind::Directory)
        } else if file_type.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }
}

/// Pack `source_dir` into a gzip compressed tar archive at `destination`.
///
/// Any existing file at `destination` is removed first. If writing fails
/// after the archive was created, the incomplete file is removed as well.
pub fn pack(ctx: &Context, source_dir: &Path, destination: &Path) -> Result<PackSummary> {
    match fs::metadata(source_dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(Error::SourceNotDirectory(source_dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(source_dir.to_path_buf()));
        }
        Err(e) => return Err(Error::fs("read source directory", source_dir, e)),
    }

    remove_stale(destination)?;

    let file = File::create(destination).map_err(|e| Error::fs("create archive", destination, e))?;

    write_archive(ctx, file, source_dir, destination).or_else(|err| {
        match fs::remove_file(destination) {
            Ok(()) => Err(err),
            Err(cleanup) => Err(Error::Incomplete {
                source: Box::new(err),
                path: destination.to_path_buf(),
                cleanup,
            }),
        }
    })
}

fn remove_stale(destination: &Path) -> Result<()> {
    match fs::symlink_metadata(destination) {
        Ok(_) => {
            fs::remove_file(destination).map_err(|e| Error::fs("remove stale archive", destination, e))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::fs("inspect stale archive", destination, e)),
    }
}

fn write_archive(
    ctx: &Context,
    file: File,
    source_dir: &Path,
    destination: &Path,
) -> Result<PackSummary> {
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = Builder::new(enc);
    tar.follow_symlinks(false);
    tar.mode(HeaderMode::Complete);

    // The archive may live inside the tree it packs
    let archive_path = fs::canonicalize(destination).ok();

    let mut summary = PackSummary::default();

    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_dir.to_path_buf());
            Error::fs("read entry", path, err.into())
        })?;

        let path = entry.path();
        let name = relative_name(source_dir, path)?;

        let Some(kind) = EntryKind::of(entry.file_type()) else {
            summary.skipped.push(Skipped {
                path: path.to_path_buf(),
                reason: "special file",
            });
            continue;
        };

        if kind == EntryKind::File && is_archive(path, destination, archive_path.as_deref()) {
            summary.skipped.push(Skipped {
                path: path.to_path_buf(),
                reason: "the archive itself",
            });
            continue;
        }

        tar.append_path_with_name(path, &name)
            .map_err(|e| Error::fs("add entry", path, e))?;

        if ctx.verbose {
            summary.added.push(name);
        }

        match kind {
            EntryKind::Directory => summary.directories += 1,
            EntryKind::Symlink => summary.symlinks += 1,
            EntryKind::File => {
                summary.files += 1;
                summary.content_bytes += entry
                    .metadata()
                    .map_err(|err| Error::fs("read entry", path, err.into()))?
                    .len();
            }
        }
    }

    let enc = tar
        .into_inner()
        .map_err(|e| Error::fs("finish archive", destination, e))?;
    let file = enc
        .finish()
        .map_err(|e| Error::fs("finish archive", destination, e))?;
    summary.archive_bytes = file
        .metadata()
        .map_err(|e| Error::fs("read archive", destination, e))?
        .len();

    Ok(summary)
}

/// Member name for `path`, relative to the source root
fn relative_name(source_dir: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(source_dir)
        .map(Path::to_path_buf)
        .map_err(|_| {
            Error::custom(format!(
                "{} is outside of {}",
                path.display(),
                source_dir.display()
            ))
        })
}

fn is_archive(path: &Path, destination: &Path, archive_path: Option<&Path>) -> bool {
    let Some(archive_path) = archive_path else {
        return false;
    };
    if path.file_name() != destination.file_name() {
        return false;
    }
    fs::canonicalize(path).is_ok_and(|p| p == archive_path)
}
