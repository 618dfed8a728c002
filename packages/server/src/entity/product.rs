use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A catalog product. Asset columns hold bare filenames on the public disk,
/// not foreign keys.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    pub price: f64,

    #[sea_orm(indexed)]
    pub category: Option<String>,

    /// Filename under `images/`.
    pub image: Option<String>,

    /// Filename under `ar_models/`.
    pub glb_model: Option<String>,

    /// Filename under `ar_models/`.
    pub usdz_model: Option<String>,

    /// Derived from `glb_model`/`usdz_model`; see [`ar_enabled`].
    #[sea_orm(default_value = false, indexed)]
    pub ar_enabled: bool,

    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,

    #[sea_orm(column_type = "Text")]
    pub ar_placement_instructions: Option<String>,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_ar_models(&self) -> bool {
        ar_enabled(self.glb_model.as_deref(), self.usdz_model.as_deref())
    }
}

/// A product is AR-enabled iff at least one model reference is non-empty.
pub fn ar_enabled(glb_model: Option<&str>, usdz_model: Option<&str>) -> bool {
    let present = |f: Option<&str>| f.is_some_and(|f| !f.is_empty());
    present(glb_model) || present(usdz_model)
}
