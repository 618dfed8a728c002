pub mod asset;
pub mod storage;

pub use asset::{ArModelKind, UploadedFile, ValidationError};
pub use storage::{Disk, LocalDisk, StorageError};
