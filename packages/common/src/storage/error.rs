use thiserror::Error;

/// Errors that can occur during disk operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested file was not found.
    #[error("file not found: {0}")]
    NotFound(String),
    /// Writing a file failed (disk full, permission denied, ...).
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The relative path is malformed or escapes the disk root.
    #[error("invalid storage path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
    /// Any other I/O error.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn write_failed(path: &str, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.to_string(),
            source,
        }
    }
}
