use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};

use crate::entity::product;

/// Source of the AR model filenames that products currently reference.
#[async_trait]
pub trait AssetReferences: Send + Sync {
    async fn referenced_ar_models(&self) -> Result<HashSet<String>, DbErr>;
}

#[async_trait]
impl AssetReferences for DatabaseConnection {
    async fn referenced_ar_models(&self) -> Result<HashSet<String>, DbErr> {
        let rows: Vec<(Option<String>, Option<String>)> = product::Entity::find()
            .select_only()
            .column(product::Column::GlbModel)
            .column(product::Column::UsdzModel)
            .filter(
                Condition::any()
                    .add(product::Column::GlbModel.is_not_null())
                    .add(product::Column::UsdzModel.is_not_null()),
            )
            .into_tuple()
            .all(self)
            .await?;

        Ok(rows
            .into_iter()
            .flat_map(|(glb, usdz)| [glb, usdz])
            .flatten()
            .filter(|f| !f.is_empty())
            .collect())
    }
}
