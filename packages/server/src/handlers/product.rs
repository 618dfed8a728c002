use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{Span, info, instrument, warn};

use crate::ar_model::{ArModelService, AssetSlot, StoredAsset};
use crate::config::StorageConfig;
use crate::entity::product;
use crate::error::{AppError, ErrorBody};
use crate::models::product::{
    ArViewResponse, DEFAULT_PER_PAGE, MAX_PER_PAGE, ProductChanges, ProductForm,
    ProductListQuery, ProductListResponse, ProductResponse,
};
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::multipart::{read_text, rejection, spool_field};

/// Room for one file per slot plus the text fields.
pub fn product_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let total = storage.image_max_file_size + 2 * storage.ar_max_file_size + 1024 * 1024;
    DefaultBodyLimit::max(usize::try_from(total).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products",
    description = "Returns a paginated product list, newest first. Supports case-insensitive name search and filtering by category or AR availability.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "List of products", body = ProductListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    // Postgres takes OFFSET as a signed 64-bit integer.
    let offset = (page - 1)
        .checked_mul(per_page)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))?;

    let mut select = product::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(ref category) = query.category {
        select = select.filter(product::Column::Category.eq(category.trim()));
    }
    if let Some(ar_enabled) = query.ar_enabled {
        select = select.filter(product::Column::ArEnabled.eq(ar_enabled));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by(product::Column::CreatedAt, Order::Desc)
        .order_by(product::Column::Id, Order::Desc)
        .offset(Some(offset))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|model| ProductResponse::new(model, &state.assets))
        .collect();

    Ok(Json(ProductListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get product details",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let model = find_product(&state.db, id).await?;
    Ok(Json(ProductResponse::new(model, &state.assets)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Creates a product from a multipart form. `name` and `price` are required. \
        Optional file parts: `image`, `glb_model` (alias `ar_model_glb`) and `usdz_model` \
        (alias `ar_model_usdz`). An empty file input is treated as absent. `ar_enabled` is \
        derived from the stored AR models.",
    request_body(content_type = "multipart/form-data", description = "Product fields and asset files"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(product_id))]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_product_form(multipart, &state.assets).await?;
    let changes = form.changes()?;

    let name = changes
        .name
        .clone()
        .ok_or_else(|| AppError::Validation("Name is required".into()))?;
    let price = changes
        .price
        .ok_or_else(|| AppError::Validation("Price is required".into()))?;

    let staged = StagedAssets::store(&state.assets, &form, &name).await?;

    let now = Utc::now();
    let glb_model = staged.filename(AssetSlot::Glb);
    let usdz_model = staged.filename(AssetSlot::Usdz);
    let new_product = product::ActiveModel {
        name: Set(name),
        price: Set(price),
        description: Set(changes.description.flatten()),
        category: Set(changes.category.flatten()),
        image: Set(staged.filename(AssetSlot::Image)),
        ar_enabled: Set(product::ar_enabled(
            glb_model.as_deref(),
            usdz_model.as_deref(),
        )),
        glb_model: Set(glb_model),
        usdz_model: Set(usdz_model),
        width_cm: Set(changes.width_cm.flatten()),
        height_cm: Set(changes.height_cm.flatten()),
        depth_cm: Set(changes.depth_cm.flatten()),
        ar_placement_instructions: Set(changes.ar_placement_instructions.flatten()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = match new_product.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            staged.discard().await;
            return Err(e.into());
        }
    };

    Span::current().record("product_id", model.id);
    info!(
        product_id = model.id,
        ar_enabled = model.ar_enabled,
        "Product created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::new(model, &state.assets)),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update a product",
    description = "Partially updates a product from a multipart form. Absent parts leave the \
        column untouched; an empty optional text part clears it. A new file for a slot replaces \
        the old one, which is deleted from storage once the product is saved. Slots without a \
        new file keep their current file.",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Changed fields and replacement files"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    let existing = find_product(&state.db, id).await?;

    let form = read_product_form(multipart, &state.assets).await?;
    let changes = form.changes()?;
    let product_name = changes.name.as_deref().unwrap_or(&existing.name).to_string();

    let staged = StagedAssets::store(&state.assets, &form, &product_name).await?;

    let mut active: product::ActiveModel = existing.clone().into();
    apply_changes(&mut active, changes);

    let mut glb_model = existing.glb_model.clone();
    let mut usdz_model = existing.usdz_model.clone();
    for (slot, stored) in &staged.stored {
        let filename = Some(stored.filename.clone());
        match slot {
            AssetSlot::Image => active.image = Set(filename),
            AssetSlot::Glb => glb_model = filename,
            AssetSlot::Usdz => usdz_model = filename,
        }
    }
    active.ar_enabled = Set(product::ar_enabled(
        glb_model.as_deref(),
        usdz_model.as_deref(),
    ));
    active.glb_model = Set(glb_model);
    active.usdz_model = Set(usdz_model);
    active.updated_at = Set(Utc::now());

    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            staged.discard().await;
            return Err(e.into());
        }
    };

    for (slot, stored) in &staged.stored {
        let Some(old) = slot_filename(&existing, *slot).filter(|old| *old != stored.filename)
        else {
            continue;
        };
        if !state.assets.delete_slot(*slot, old).await {
            warn!(product_id = id, %slot, filename = old, "Failed to delete replaced file");
        }
    }

    info!(
        product_id = id,
        replaced = staged.stored.len(),
        ar_enabled = model.ar_enabled,
        "Product updated"
    );
    Ok(Json(ProductResponse::new(model, &state.assets)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Deletes the product's image and AR model files (best effort), then the product.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_product(&state.db, id).await?;

    for slot in [AssetSlot::Image, AssetSlot::Glb, AssetSlot::Usdz] {
        let Some(filename) = slot_filename(&existing, slot) else {
            continue;
        };
        if !state.assets.delete_slot(slot, filename).await {
            warn!(product_id = id, %slot, filename, "Failed to delete product file");
        }
    }

    product::Entity::delete_by_id(id).exec(&state.db).await?;

    info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/ar",
    tag = "Products",
    operation_id = "getProductArView",
    summary = "Get the AR view payload",
    description = "Returns the model URLs, dimensions and placement instructions an AR viewer needs. \
        Fails with `DANGLING_REFERENCE` when a referenced model file is missing from storage.",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "AR view payload", body = ArViewResponse),
        (status = 404, description = "Product not found or has no AR models (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Model file missing (DANGLING_REFERENCE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product_ar_view(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ArViewResponse>, AppError> {
    let model = find_product(&state.db, id).await?;
    if !model.has_ar_models() {
        return Err(AppError::NotFound(
            "AR view is not available for this product".into(),
        ));
    }

    state.assets.ensure_models_present(&model).await?;
    Ok(Json(ArViewResponse::new(model, &state.assets)))
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<product::Model, AppError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

async fn read_product_form(
    mut multipart: Multipart,
    assets: &ArModelService,
) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(rejection)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                if let Some(file) = spool_field(field, assets.image_max_file_size()).await? {
                    form.image = Some(file);
                }
            }
            "glb_model" | "ar_model_glb" => {
                if let Some(file) = spool_field(field, assets.ar_max_file_size()).await? {
                    form.glb_model = Some(file);
                }
            }
            "usdz_model" | "ar_model_usdz" => {
                if let Some(file) = spool_field(field, assets.ar_max_file_size()).await? {
                    form.usdz_model = Some(file);
                }
            }
            "name" => form.name = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "price" => form.price = Some(read_text(field).await?),
            "category" => form.category = Some(read_text(field).await?),
            "width_cm" => form.width_cm = Some(read_text(field).await?),
            "height_cm" => form.height_cm = Some(read_text(field).await?),
            "depth_cm" => form.depth_cm = Some(read_text(field).await?),
            "ar_placement_instructions" => {
                form.ar_placement_instructions = Some(read_text(field).await?)
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

fn apply_changes(active: &mut product::ActiveModel, changes: ProductChanges) {
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(category) = changes.category {
        active.category = Set(category);
    }
    if let Some(width_cm) = changes.width_cm {
        active.width_cm = Set(width_cm);
    }
    if let Some(height_cm) = changes.height_cm {
        active.height_cm = Set(height_cm);
    }
    if let Some(depth_cm) = changes.depth_cm {
        active.depth_cm = Set(depth_cm);
    }
    if let Some(instructions) = changes.ar_placement_instructions {
        active.ar_placement_instructions = Set(instructions);
    }
}

fn slot_filename(model: &product::Model, slot: AssetSlot) -> Option<&str> {
    let filename = match slot {
        AssetSlot::Image => &model.image,
        AssetSlot::Glb => &model.glb_model,
        AssetSlot::Usdz => &model.usdz_model,
    };
    filename.as_deref().filter(|f| !f.is_empty())
}

/// Files written for one request. Discarded again if the product row
/// cannot be saved.
struct StagedAssets<'a> {
    assets: &'a ArModelService,
    stored: Vec<(AssetSlot, StoredAsset)>,
}

impl<'a> StagedAssets<'a> {
    /// Store every supplied file; on the first failure, remove the ones
    /// already written and return the error.
    async fn store(
        assets: &'a ArModelService,
        form: &ProductForm,
        product_name: &str,
    ) -> Result<Self, AppError> {
        let mut staged = Self {
            assets,
            stored: Vec::new(),
        };
        let slots = [
            (AssetSlot::Image, form.image.as_ref()),
            (AssetSlot::Glb, form.glb_model.as_ref()),
            (AssetSlot::Usdz, form.usdz_model.as_ref()),
        ];

        for (slot, file) in slots {
            let Some(file) = file else {
                continue;
            };
            match assets.upload_slot(slot, file, Some(product_name)).await {
                Ok(stored) => staged.stored.push((slot, stored)),
                Err(e) => {
                    warn!(%slot, error = %e, "Rejected product file");
                    staged.discard().await;
                    return Err(e.into());
                }
            }
        }

        Ok(staged)
    }

    fn filename(&self, slot: AssetSlot) -> Option<String> {
        self.stored
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, stored)| stored.filename.clone())
    }

    async fn discard(self) {
        for (slot, stored) in self.stored {
            self.assets.delete_slot(slot, &stored.filename).await;
        }
    }
}
