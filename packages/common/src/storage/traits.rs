use std::io::Cursor;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// A named storage disk addressed by `/`-separated relative paths.
#[async_trait]
pub trait Disk: Send + Sync {
    /// Whether a regular file exists at `path`.
    async fn exists(&self, path: &str) -> bool;

    /// Store bytes at `path`, replacing any previous file. Returns the path.
    async fn put(&self, path: &str, data: &[u8]) -> Result<String, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(path, reader).await
    }

    /// Store data from an async reader at `path`. Returns the path.
    async fn put_stream(&self, path: &str, reader: BoxReader) -> Result<String, StorageError>;

    /// Remove the file at `path`.
    ///
    /// Returns `true` if the file was removed or was already absent, and
    /// `false` only when the removal itself failed.
    async fn delete(&self, path: &str) -> bool;

    /// Size of the file in bytes.
    async fn size(&self, path: &str) -> Result<u64, StorageError>;

    /// Last modification time of the file.
    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError>;

    /// Lazily list the regular files directly inside `dir`, as disk paths.
    ///
    /// A directory that does not exist yields an empty stream.
    fn list_files(&self, dir: &str) -> BoxStream<'_, Result<String, StorageError>>;

    /// Public URL under which `path` is served.
    fn url(&self, path: &str) -> String;
}
