mod error;
mod path;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::LocalDisk;
pub use path::{join, validate_file_name, validate_relative_path};
pub use traits::{BoxReader, Disk};
