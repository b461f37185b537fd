//! Error type for catalog building.
//!
//! HTTP-facing failures live in [`crate::server::ServeError`]; this type covers
//! everything that happens before a request is involved.

use std::path::PathBuf;

/// Failure modes of the podserve library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Walking the media directory failed (unreadable directory, stat failure).
    #[error("Scan error at {}: {source}", path.display())]
    Scan {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Scan`].
    pub fn scan(root: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| root.into());
        Error::Scan { path, source }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_names_missing_root() {
        let root = std::path::Path::new("/definitely/not/here");
        let walk_err = walkdir::WalkDir::new(root)
            .into_iter()
            .find_map(|entry| entry.err())
            .unwrap();
        let err = Error::scan(root, walk_err);
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[test]
    fn io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.to_string(), "IO error: gone");
    }
}
