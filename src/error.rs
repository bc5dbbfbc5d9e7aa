use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    // Construction
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid concurrency {0}: must be at least 1")]
    InvalidConcurrency(usize),

    #[error("invalid batch size {0}: must be at least 1")]
    InvalidBatchSize(usize),

    #[error("invalid channel capacity {0}: must be at least 1")]
    InvalidChannelCapacity(usize),

    // Traversal
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Map an I/O failure at `path` to a traversal error.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            ScanError::PermissionDenied(path)
        } else {
            ScanError::Io { path, source: err }
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the scan keeps going after this error.
    ///
    /// Recoverable errors are scoped to one directory and arrive on the
    /// error stream. Everything else is a construction failure returned
    /// before any traversal starts.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn permission_denied_is_mapped() {
        let err = ScanError::from_io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::PermissionDenied(ref p) if p == Path::new("/x")));
        assert!(err.is_recoverable());
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let err = ScanError::from_io("/y", io::Error::other("boom"));
        assert!(err.is_recoverable());
        assert_eq!(err.path(), Some(Path::new("/y")));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn construction_errors_are_fatal() {
        assert!(!ScanError::NotFound("/nope".into()).is_recoverable());
        assert!(!ScanError::NotADirectory("/f".into()).is_recoverable());
        assert!(!ScanError::InvalidConcurrency(0).is_recoverable());
        assert_eq!(ScanError::InvalidBatchSize(0).path(), None);
    }
}
