use std::io::Cursor;
use std::path::PathBuf;

use crate::storage::BoxReader;

enum Body {
    Memory(Vec<u8>),
    /// Spooled to a temp file owned by this upload; removed on drop.
    Spooled(PathBuf),
    /// The transport failed mid-upload.
    Corrupt(String),
}

/// A file received from a client, before validation.
pub struct UploadedFile {
    client_name: String,
    content_type: Option<String>,
    size: u64,
    body: Body,
}

impl UploadedFile {
    /// An upload held fully in memory.
    pub fn from_bytes(
        client_name: impl Into<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            content_type,
            size: data.len() as u64,
            body: Body::Memory(data),
        }
    }

    /// An upload already streamed to `path`. Ownership of the file passes
    /// to the returned value.
    ///
    /// `size` is the number of bytes received, which may exceed what was
    /// written when the sender was cut off at a size cap.
    pub fn spooled(
        client_name: impl Into<String>,
        content_type: Option<String>,
        path: PathBuf,
        size: u64,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            content_type,
            size,
            body: Body::Spooled(path),
        }
    }

    /// An upload the transport could not deliver intact.
    pub fn corrupt(
        client_name: impl Into<String>,
        content_type: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            content_type,
            size: 0,
            body: Body::Corrupt(reason.into()),
        }
    }

    /// Original filename as sent by the client.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Why the transport marked this upload as corrupt, if it did.
    pub fn corruption(&self) -> Option<&str> {
        match &self.body {
            Body::Corrupt(reason) => Some(reason),
            _ => None,
        }
    }

    /// Lowercased extension of the client filename.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.client_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Open the upload contents for streaming into storage.
    pub async fn open(&self) -> std::io::Result<BoxReader> {
        match &self.body {
            Body::Memory(data) => Ok(Box::new(Cursor::new(data.clone()))),
            Body::Spooled(path) => Ok(Box::new(tokio::fs::File::open(path).await?)),
            Body::Corrupt(reason) => Err(std::io::Error::other(reason.clone())),
        }
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        if let Body::Spooled(path) = &self.body {
            // Best effort.
            let _ = std::fs::remove_file(path);
        }
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("client_name", &self.client_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .field("corrupt", &self.corruption().is_some())
            .finish()
    }
}
