use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Failed to {op} {}: {source}", path.display())]
    Fs {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source} (incomplete archive left at {}: {cleanup})", path.display())]
    Incomplete {
        source: Box<Error>,
        path: PathBuf,
        cleanup: std::io::Error,
    },

    #[error("Manifest not found: {0}")]
    ManifestNotFound(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }

    /// Attach the failing operation and path to an I/O error
    pub fn fs<P: Into<PathBuf>>(op: &'static str, path: P, source: std::io::Error) -> Self {
        Error::Fs {
            op,
            path: path.into(),
            source,
        }
    }
}
