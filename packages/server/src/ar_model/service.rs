use std::collections::HashSet;
use std::sync::Arc;

use futures::TryStreamExt;
use luna_common::asset::filename::{ar_model_filename, image_filename};
use luna_common::asset::{format_file_size, validate_ar_model, validate_image};
use luna_common::storage::join;
use luna_common::{ArModelKind, Disk, StorageError, UploadedFile, ValidationError};
use tracing::{error, info, instrument, warn};

use crate::entity::product;

use super::{
    AR_MODEL_DIR, ArModelError, AssetInfo, AssetReferences, AssetSlot, CleanupReport, IMAGE_DIR,
    StoredAsset,
};

/// Single entry point for product asset files.
///
/// Each upload runs validate → name → store and returns a typed error at the
/// first failing step; a rejected upload never reaches the disk.
#[derive(Clone)]
pub struct ArModelService {
    disk: Arc<dyn Disk>,
    ar_max_file_size: u64,
    image_max_file_size: u64,
}

impl ArModelService {
    pub fn new(disk: Arc<dyn Disk>, ar_max_file_size: u64, image_max_file_size: u64) -> Self {
        Self {
            disk,
            ar_max_file_size,
            image_max_file_size,
        }
    }

    pub fn ar_max_file_size(&self) -> u64 {
        self.ar_max_file_size
    }

    pub fn image_max_file_size(&self) -> u64 {
        self.image_max_file_size
    }

    pub fn model_url(&self, filename: &str) -> String {
        self.disk.url(&join(AR_MODEL_DIR, filename))
    }

    pub fn image_url(&self, filename: &str) -> String {
        self.disk.url(&join(IMAGE_DIR, filename))
    }

    /// Validate, name and store an AR model.
    #[instrument(skip(self, file), fields(kind = %kind, size = file.size()))]
    pub async fn upload(
        &self,
        file: &UploadedFile,
        kind: ArModelKind,
        product_name: Option<&str>,
    ) -> Result<StoredAsset, ArModelError> {
        if let Err(e) = validate_ar_model(file, kind, self.ar_max_file_size) {
            warn!(client_name = file.client_name(), error = %e, "AR model rejected");
            return Err(e.into());
        }

        let filename = ar_model_filename(kind, product_name);
        let stored = self
            .store(file, AR_MODEL_DIR, filename)
            .await
            .inspect_err(|e| error!(error = %e, product_name, "AR model upload failed"))?;

        info!(
            filename = %stored.filename,
            size = stored.size,
            product_name,
            "AR model uploaded successfully"
        );
        Ok(stored)
    }

    /// Validate, name and store a product image.
    #[instrument(skip(self, file), fields(size = file.size()))]
    pub async fn upload_image(
        &self,
        file: &UploadedFile,
        product_name: Option<&str>,
    ) -> Result<StoredAsset, ArModelError> {
        if let Err(e) = validate_image(file, self.image_max_file_size) {
            warn!(client_name = file.client_name(), error = %e, "Product image rejected");
            return Err(e.into());
        }

        let extension = file.extension().unwrap_or_default();
        let filename = image_filename(&extension, product_name);
        let stored = self
            .store(file, IMAGE_DIR, filename)
            .await
            .inspect_err(|e| error!(error = %e, product_name, "Product image upload failed"))?;

        info!(filename = %stored.filename, size = stored.size, "Product image uploaded");
        Ok(stored)
    }

    /// Store a file for the given product slot.
    pub async fn upload_slot(
        &self,
        slot: AssetSlot,
        file: &UploadedFile,
        product_name: Option<&str>,
    ) -> Result<StoredAsset, ArModelError> {
        match slot {
            AssetSlot::Image => self.upload_image(file, product_name).await,
            AssetSlot::Glb => self.upload(file, ArModelKind::Glb, product_name).await,
            AssetSlot::Usdz => self.upload(file, ArModelKind::Usdz, product_name).await,
        }
    }

    async fn store(
        &self,
        file: &UploadedFile,
        dir: &str,
        filename: String,
    ) -> Result<StoredAsset, ArModelError> {
        let path = join(dir, &filename);
        let reader = file
            .open()
            .await
            .map_err(|e| ValidationError::UploadCorrupt(e.to_string()))?;
        let path = self.disk.put_stream(&path, reader).await?;

        Ok(StoredAsset {
            url: self.disk.url(&path),
            filename,
            path,
            size: file.size(),
        })
    }

    /// Delete an AR model by filename.
    ///
    /// An empty filename or an already-absent file counts as deleted.
    pub async fn delete(&self, filename: &str) -> bool {
        self.delete_in(AR_MODEL_DIR, filename).await
    }

    pub async fn delete_image(&self, filename: &str) -> bool {
        self.delete_in(IMAGE_DIR, filename).await
    }

    pub async fn delete_slot(&self, slot: AssetSlot, filename: &str) -> bool {
        match slot {
            AssetSlot::Image => self.delete_image(filename).await,
            AssetSlot::Glb | AssetSlot::Usdz => self.delete(filename).await,
        }
    }

    async fn delete_in(&self, dir: &str, filename: &str) -> bool {
        if filename.is_empty() {
            return true;
        }

        // `Disk::delete` counts an absent file as removed.
        let deleted = self.disk.delete(&join(dir, filename)).await;
        if deleted {
            info!(filename, dir, "File deleted successfully");
        } else {
            error!(filename, dir, "Failed to delete file");
        }
        deleted
    }

    pub async fn exists(&self, filename: &str) -> bool {
        if filename.is_empty() {
            return false;
        }
        self.disk.exists(&join(AR_MODEL_DIR, filename)).await
    }

    /// Size, URL and modification time of a stored AR model.
    pub async fn info(&self, filename: &str) -> Option<AssetInfo> {
        if !self.exists(filename).await {
            return None;
        }

        let path = join(AR_MODEL_DIR, filename);
        let read = async {
            let size = self.disk.size(&path).await?;
            let last_modified = self.disk.last_modified(&path).await?;
            Ok::<_, StorageError>((size, last_modified))
        }
        .await;

        match read {
            Ok((size_bytes, last_modified)) => Some(AssetInfo {
                filename: filename.to_string(),
                size_bytes,
                size_human: format_file_size(size_bytes),
                url: self.disk.url(&path),
                last_modified,
            }),
            Err(e) => {
                error!(filename, error = %e, "Failed to get AR model info");
                None
            }
        }
    }

    /// Fail with [`ArModelError::DanglingReference`] if the product points at
    /// an AR model that is missing from the disk.
    pub async fn ensure_models_present(&self, product: &product::Model) -> Result<(), ArModelError> {
        let slots = [
            (AssetSlot::Glb, product.glb_model.as_deref()),
            (AssetSlot::Usdz, product.usdz_model.as_deref()),
        ];
        for (slot, filename) in slots {
            let Some(filename) = filename.filter(|f| !f.is_empty()) else {
                continue;
            };
            if !self.exists(filename).await {
                warn!(product_id = product.id, %slot, filename, "Dangling AR model reference");
                return Err(ArModelError::DanglingReference {
                    product_id: product.id,
                    slot,
                    filename: filename.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Delete every AR model file no product references.
    ///
    /// The listing and the deletions are not atomic with respect to product
    /// updates: a model attached between the two steps can be removed. The
    /// sweep is periodic maintenance and tolerates that window.
    pub async fn cleanup_orphans(
        &self,
        references: &dyn AssetReferences,
    ) -> Result<CleanupReport, ArModelError> {
        let referenced: HashSet<String> = references
            .referenced_ar_models()
            .await?
            .iter()
            .map(|filename| join(AR_MODEL_DIR, filename))
            .collect();

        let files: Vec<String> = self.disk.list_files(AR_MODEL_DIR).try_collect().await?;

        let mut report = CleanupReport {
            total_files: files.len() as u64,
            ..Default::default()
        };

        for path in files.iter().filter(|path| !referenced.contains(*path)) {
            report.orphaned_files += 1;
            if self.disk.delete(path).await {
                report.deleted_files += 1;
                info!(file = %path, "Deleted orphaned AR model");
            } else {
                warn!(file = %path, "Failed to delete orphaned AR model");
            }
        }

        info!(
            total_files = report.total_files,
            orphaned_files = report.orphaned_files,
            deleted_files = report.deleted_files,
            "AR model cleanup finished"
        );
        Ok(report)
    }
}
