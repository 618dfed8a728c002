use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use super::error::StorageError;
use super::path::{join, validate_relative_path};
use super::traits::{BoxReader, Disk};

/// Filesystem-backed disk rooted at a local directory.
///
/// Writes land in `{root}/.tmp` first and are renamed into place, so a
/// reader never observes a half-written file.
pub struct LocalDisk {
    root: PathBuf,
    public_url: String,
}

impl LocalDisk {
    /// Create a disk rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf, public_url: impl Into<String>) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_url: public_url.into(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let path = validate_relative_path(path)?;
        Ok(self.root.join(path))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

enum Listing {
    Start(PathBuf),
    Reading(fs::ReadDir),
    Done,
}

#[async_trait]
impl Disk for LocalDisk {
    async fn exists(&self, path: &str) -> bool {
        let Ok(full) = self.resolve(path) else {
            return false;
        };
        match fs::metadata(&full).await {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path, error = %e, "Failed to stat file");
                false
            }
        }
    }

    async fn put_stream(&self, path: &str, mut reader: BoxReader) -> Result<String, StorageError> {
        let target = self.resolve(path)?;
        let temp_path = self.temp_path();

        let written = async {
            let mut temp_file = fs::File::create(&temp_path).await?;
            tokio::io::copy(&mut reader, &mut temp_file).await?;
            temp_file.flush().await?;
            temp_file.sync_all().await?;
            drop(temp_file);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&temp_path, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::write_failed(path, e));
        }

        Ok(path.to_string())
    }

    async fn delete(&self, path: &str) -> bool {
        let full = match self.resolve(path) {
            Ok(full) => full,
            Err(e) => {
                warn!(path, error = %e, "Refusing to delete invalid path");
                return false;
            }
        };
        match fs::remove_file(&full).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                error!(path, error = %e, "Failed to delete file");
                false
            }
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let full = self.resolve(path)?;
        match fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(StorageError::NotFound(path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn last_modified(&self, path: &str) -> Result<DateTime<Utc>, StorageError> {
        let full = self.resolve(path)?;
        match fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(DateTime::<Utc>::from(meta.modified()?)),
            Ok(_) => Err(StorageError::NotFound(path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_files(&self, dir: &str) -> BoxStream<'_, Result<String, StorageError>> {
        let dir = dir.trim_end_matches('/').to_string();
        let full = match self.resolve(&dir) {
            Ok(full) => full,
            Err(e) => {
                return stream::once(async move { Err::<String, StorageError>(e) }).boxed();
            }
        };

        stream::unfold(Listing::Start(full), move |state| {
            let dir = dir.clone();
            async move {
                let mut entries = match state {
                    Listing::Start(full) => match fs::read_dir(&full).await {
                        Ok(entries) => entries,
                        Err(e) if e.kind() == ErrorKind::NotFound => return None,
                        Err(e) => return Some((Err(e.into()), Listing::Done)),
                    },
                    Listing::Reading(entries) => entries,
                    Listing::Done => return None,
                };

                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => return None,
                        Err(e) => return Some((Err(e.into()), Listing::Done)),
                    };

                    let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                        continue;
                    };
                    if name.starts_with('.') {
                        continue;
                    }

                    match entry.file_type().await {
                        Ok(kind) if kind.is_file() => {
                            return Some((Ok(join(&dir, &name)), Listing::Reading(entries)));
                        }
                        Ok(_) => continue,
                        Err(e) => return Some((Err(e.into()), Listing::Reading(entries))),
                    }
                }
            }
        })
        .boxed()
    }

    fn url(&self, path: &str) -> String {
        join(&self.public_url, path)
    }
}
