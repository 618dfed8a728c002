use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::info;

use crate::entity::product;

/// A catalog entry with real-world dimensions, ready for AR model uploads.
pub struct SampleProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub category: &'static str,
    /// Width, height and depth in centimetres.
    pub dimensions: (f64, f64, f64),
    pub placement: &'static str,
}

pub const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Modern Office Chair",
        description: "Ergonomic office chair with lumbar support and adjustable height.",
        price: 299.99,
        category: "Seating",
        dimensions: (60.0, 120.0, 60.0),
        placement: "Place on flat floor surface. Best viewed from sitting position height.",
    },
    SampleProduct {
        name: "Scandinavian Dining Table",
        description: "Minimalist oak dining table that seats six.",
        price: 899.99,
        category: "Tables",
        dimensions: (180.0, 75.0, 90.0),
        placement: "Requires large flat surface. Ensure 1 meter clearance around table.",
    },
    SampleProduct {
        name: "Industrial Bookshelf",
        description: "Bookshelf with a metal frame and wooden shelves.",
        price: 449.99,
        category: "Storage",
        dimensions: (80.0, 200.0, 35.0),
        placement: "Place against wall. Check ceiling height before placement.",
    },
    SampleProduct {
        name: "Velvet Accent Chair",
        description: "Emerald green velvet accent chair for reading corners.",
        price: 599.99,
        category: "Seating",
        dimensions: (75.0, 85.0, 80.0),
        placement: "Great for corners or beside existing furniture. Allow space for reclining.",
    },
    SampleProduct {
        name: "Glass Coffee Table",
        description: "Tempered glass coffee table with chrome legs.",
        price: 399.99,
        category: "Tables",
        dimensions: (120.0, 45.0, 60.0),
        placement: "Center in front of seating area. Consider leg clearance underneath.",
    },
    SampleProduct {
        name: "Classic Wooden Wardrobe",
        description: "Wooden wardrobe with mirror doors and multiple compartments.",
        price: 1299.99,
        category: "Storage",
        dimensions: (180.0, 220.0, 60.0),
        placement: "Requires large bedroom space. Check door opening clearance.",
    },
];

/// Insert the sample catalog, skipping products whose name already exists.
///
/// Samples carry no model files, so they stay AR-disabled until a GLB or
/// USDZ is uploaded for them. Returns the number of rows inserted.
pub async fn seed_sample_products(db: &DatabaseConnection) -> Result<u32, DbErr> {
    let mut inserted = 0u32;
    for sample in SAMPLE_PRODUCTS {
        let existing = product::Entity::find()
            .filter(product::Column::Name.eq(sample.name))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let (width, height, depth) = sample.dimensions;
        let now = Utc::now();
        product::ActiveModel {
            name: Set(sample.name.to_string()),
            description: Set(Some(sample.description.to_string())),
            price: Set(sample.price),
            category: Set(Some(sample.category.to_string())),
            ar_enabled: Set(false),
            width_cm: Set(Some(width)),
            height_cm: Set(Some(height)),
            depth_cm: Set(Some(depth)),
            ar_placement_instructions: Set(Some(sample.placement.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {} sample products", inserted);
    }
    Ok(inserted)
}
