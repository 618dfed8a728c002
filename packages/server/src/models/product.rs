use chrono::{DateTime, Utc};
use luna_common::UploadedFile;
use serde::{Deserialize, Serialize};

use crate::ar_model::ArModelService;
use crate::entity::product;
use crate::error::AppError;

use super::shared::{Pagination, optional_non_negative, optional_text, parse_non_negative};

pub const DEFAULT_PER_PAGE: u64 = 12;
pub const MAX_PER_PAGE: u64 = 100;
pub const MAX_NAME_LEN: usize = 255;

/// Response DTO for a single product.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Modern Office Chair")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 199.99)]
    pub price: f64,
    #[schema(example = "Chairs")]
    pub category: Option<String>,
    /// Stored image filename.
    pub image: Option<String>,
    #[schema(example = "/storage/images/modern_office_chair_img_2025_10_09_11_16_35_Xy12Ab.jpg")]
    pub image_url: Option<String>,
    /// Stored GLB filename.
    pub glb_model: Option<String>,
    #[schema(example = "/storage/ar_models/modern_office_chair_ar_2025_10_09_11_16_35_a1B2c3.glb")]
    pub glb_model_url: Option<String>,
    /// Stored USDZ filename.
    pub usdz_model: Option<String>,
    pub usdz_model_url: Option<String>,
    /// True iff at least one AR model is attached.
    pub ar_enabled: bool,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub ar_placement_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(model: product::Model, assets: &ArModelService) -> Self {
        let url = |filename: &Option<String>, to_url: fn(&ArModelService, &str) -> String| {
            filename
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| to_url(assets, n))
        };
        Self {
            image_url: url(&model.image, ArModelService::image_url),
            glb_model_url: url(&model.glb_model, ArModelService::model_url),
            usdz_model_url: url(&model.usdz_model, ArModelService::model_url),
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image: model.image,
            glb_model: model.glb_model,
            usdz_model: model.usdz_model,
            ar_enabled: model.ar_enabled,
            width_cm: model.width_cm,
            height_cm: model.height_cm,
            depth_cm: model.depth_cm,
            ar_placement_instructions: model.ar_placement_instructions,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Response DTO for the paginated product list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub data: Vec<ProductResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Page number (1-based, default 1).
    pub page: Option<u64>,
    /// Items per page (default 12, max 100).
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Only products with (or without) AR models.
    pub ar_enabled: Option<bool>,
}

/// Physical dimensions used to scale the AR model.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductDimensions {
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
}

/// Everything an AR viewer needs to place a product.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ArViewResponse {
    pub product_id: i32,
    pub name: String,
    /// GLB model URL (Android / WebXR viewers).
    pub glb_url: Option<String>,
    /// USDZ model URL (iOS Quick Look).
    pub usdz_url: Option<String>,
    pub dimensions: ProductDimensions,
    pub placement_instructions: Option<String>,
}

impl ArViewResponse {
    pub fn new(model: product::Model, assets: &ArModelService) -> Self {
        let url = |filename: Option<String>| {
            filename
                .filter(|n| !n.is_empty())
                .map(|n| assets.model_url(&n))
        };
        Self {
            product_id: model.id,
            name: model.name,
            glb_url: url(model.glb_model),
            usdz_url: url(model.usdz_model),
            dimensions: ProductDimensions {
                width_cm: model.width_cm,
                height_cm: model.height_cm,
                depth_cm: model.depth_cm,
            },
            placement_instructions: model.ar_placement_instructions,
        }
    }
}

/// Multipart product fields as received. `None` means the part was absent.
#[derive(Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub width_cm: Option<String>,
    pub height_cm: Option<String>,
    pub depth_cm: Option<String>,
    pub ar_placement_instructions: Option<String>,
    pub image: Option<UploadedFile>,
    pub glb_model: Option<UploadedFile>,
    pub usdz_model: Option<UploadedFile>,
}

/// Validated column changes. An outer `None` leaves the column untouched,
/// `Some(None)` clears it.
#[derive(Debug, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub width_cm: Option<Option<f64>>,
    pub height_cm: Option<Option<f64>>,
    pub depth_cm: Option<Option<f64>>,
    pub ar_placement_instructions: Option<Option<String>>,
}

impl ProductForm {
    pub fn changes(&self) -> Result<ProductChanges, AppError> {
        let dimension = |value: &Option<String>, field: &str| {
            value
                .as_deref()
                .map(|v| optional_non_negative(v, field))
                .transpose()
        };

        Ok(ProductChanges {
            name: self.name.as_deref().map(validate_name).transpose()?,
            price: self
                .price
                .as_deref()
                .map(|p| parse_non_negative(p, "price"))
                .transpose()?,
            description: self.description.as_deref().map(optional_text),
            category: self.category.as_deref().map(optional_text),
            width_cm: dimension(&self.width_cm, "width_cm")?,
            height_cm: dimension(&self.height_cm, "height_cm")?,
            depth_cm: dimension(&self.depth_cm, "depth_cm")?,
            ar_placement_instructions: self.ar_placement_instructions.as_deref().map(optional_text),
        })
    }
}

/// Validate a trimmed product name (1-255 characters).
pub fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
