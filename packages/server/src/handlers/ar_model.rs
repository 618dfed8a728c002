use std::str::FromStr;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use luna_common::ArModelKind;
use luna_common::storage::validate_file_name;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{info, instrument};

use crate::ar_model::{AssetInfo, CleanupReport, StoredAsset};
use crate::config::StorageConfig;
use crate::entity::product;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::multipart::{read_text, rejection, spool_field};

pub fn ar_model_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let total = storage.ar_max_file_size + 64 * 1024;
    DefaultBodyLimit::max(usize::try_from(total).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "AR Models",
    operation_id = "uploadArModel",
    summary = "Upload a standalone AR model",
    description = "Validates and stores a GLB or USDZ file without attaching it to a product. \
        The `file` part is required. `kind` (`glb` or `usdz`) defaults to the file extension. \
        `product_name` seeds the generated filename. An unattached model is removed by the next \
        orphan sweep.",
    request_body(content_type = "multipart/form-data", description = "Model file with optional kind and product name"),
    responses(
        (status = 201, description = "Model stored", body = StoredAsset),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_ar_model(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file = None;
    let mut kind: Option<String> = None;
    let mut product_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(rejection)? {
        match field.name() {
            Some("file") => file = spool_field(field, state.assets.ar_max_file_size()).await?,
            Some("kind") => kind = Some(read_text(field).await?),
            Some("product_name") => product_name = Some(read_text(field).await?),
            _ => {} // Ignore unknown fields.
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let kind = match kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(kind) => ArModelKind::from_str(kind).map_err(|e| AppError::Validation(e.to_string()))?,
        None => file
            .extension()
            .as_deref()
            .and_then(ArModelKind::from_extension)
            .ok_or_else(|| AppError::Validation("AR model must be a .glb or .usdz file".into()))?,
    };

    let product_name = product_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let stored = state.assets.upload(&file, kind, product_name).await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    get,
    path = "/{filename}",
    tag = "AR Models",
    operation_id = "getArModelInfo",
    summary = "Get stored AR model metadata",
    params(("filename" = String, Path, description = "Stored model filename")),
    responses(
        (status = 200, description = "Model metadata", body = AssetInfo),
        (status = 400, description = "Malformed filename (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_ar_model_info(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<AssetInfo>, AppError> {
    let filename = validate_file_name(&filename)?;

    state
        .assets
        .info(filename)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("AR model not found".into()))
}

#[utoipa::path(
    delete,
    path = "/{filename}",
    tag = "AR Models",
    operation_id = "deleteArModel",
    summary = "Delete a stored AR model",
    description = "Deletes an AR model file. Models still referenced by a product cannot be deleted; \
        replace or remove them through the product instead.",
    params(("filename" = String, Path, description = "Stored model filename")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 400, description = "Malformed filename (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Model referenced by a product (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_ar_model(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let filename = validate_file_name(&filename)?;

    if !state.assets.exists(filename).await {
        return Err(AppError::NotFound("AR model not found".into()));
    }

    let references = product::Entity::find()
        .filter(
            Condition::any()
                .add(product::Column::GlbModel.eq(filename))
                .add(product::Column::UsdzModel.eq(filename)),
        )
        .count(&state.db)
        .await?;
    if references > 0 {
        return Err(AppError::Conflict(
            "AR model is referenced by a product".into(),
        ));
    }

    if !state.assets.delete(filename).await {
        return Err(AppError::Internal(format!(
            "Failed to delete AR model '{filename}'"
        )));
    }

    info!(filename, "AR model deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/cleanup",
    tag = "AR Models",
    operation_id = "cleanupArModels",
    summary = "Delete orphaned AR models",
    description = "Deletes every stored AR model that no product references and reports the counts. \
        The same sweep runs periodically in the background when enabled.",
    responses(
        (status = 200, description = "Sweep report", body = CleanupReport),
    ),
)]
#[instrument(skip(state))]
pub async fn cleanup_ar_models(
    State(state): State<AppState>,
) -> Result<Json<CleanupReport>, AppError> {
    let report = state.assets.cleanup_orphans(&state.db).await?;
    Ok(Json(report))
}
