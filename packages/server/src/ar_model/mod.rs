//! AR model lifecycle: upload, lookup, deletion and orphan cleanup of the
//! GLB/USDZ files (and product images) referenced by products.
//!
//! Controllers go through [`ArModelService`]; nothing else touches the disk.

mod references;
mod service;
mod sweep;

use std::fmt;

use chrono::{DateTime, Utc};
use luna_common::{StorageError, ValidationError};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

pub use references::AssetReferences;
pub use service::ArModelService;
pub use sweep::run_orphan_sweep;

/// Disk directory holding AR models.
pub const AR_MODEL_DIR: &str = "ar_models";

/// Disk directory holding product images.
pub const IMAGE_DIR: &str = "images";

/// The file-bearing columns of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Image,
    Glb,
    Usdz,
}

impl AssetSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Glb => "glb",
            Self::Usdz => "usdz",
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`ArModelService`].
#[derive(Debug, Error)]
pub enum ArModelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to load asset references: {0}")]
    Database(#[from] DbErr),
    /// A product points at a file that is not on the disk.
    #[error("product {product_id} references missing {slot} file '{filename}'")]
    DanglingReference {
        product_id: i32,
        slot: AssetSlot,
        filename: String,
    },
}

/// A file written to the disk by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct StoredAsset {
    /// Generated filename, the value persisted on the product.
    #[schema(example = "modern_office_chair_ar_2025_10_09_11_16_35_a1B2c3.glb")]
    pub filename: String,
    /// Disk-relative path.
    #[schema(example = "ar_models/modern_office_chair_ar_2025_10_09_11_16_35_a1B2c3.glb")]
    pub path: String,
    /// Public URL.
    #[schema(example = "/storage/ar_models/modern_office_chair_ar_2025_10_09_11_16_35_a1B2c3.glb")]
    pub url: String,
    /// Size in bytes.
    pub size: u64,
}

/// Metadata about a stored AR model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AssetInfo {
    pub filename: String,
    pub size_bytes: u64,
    /// Human-readable size, e.g. `2.5 MB`.
    #[schema(example = "2.5 MB")]
    pub size_human: String,
    pub url: String,
    pub last_modified: DateTime<Utc>,
}

/// Outcome of an orphan sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CleanupReport {
    /// Files found in the AR model directory.
    pub total_files: u64,
    /// Files not referenced by any product.
    pub orphaned_files: u64,
    /// Orphans actually removed.
    pub deleted_files: u64,
}
