mod kind;
mod size;
mod upload;
mod validate;

pub mod filename;

pub use kind::{ArModelKind, UnknownKind};
pub use size::format_file_size;
pub use upload::UploadedFile;
pub use validate::{
    DEFAULT_AR_MAX_FILE_SIZE, DEFAULT_IMAGE_MAX_FILE_SIZE, IMAGE_EXTENSIONS, ValidationError,
    validate_ar_model, validate_image,
};
