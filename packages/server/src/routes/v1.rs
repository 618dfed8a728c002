use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::{AppConfig, StorageConfig};
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/products", product_routes(&config.storage))
        .nest("/ar-models", ar_model_routes(&config.storage))
        .nest("/ar", tracking_routes())
}

fn product_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(
            handlers::product::get_product,
            handlers::product::update_product,
            handlers::product::delete_product
        ))
        .routes(routes!(handlers::product::get_product_ar_view))
        .layer(handlers::product::product_body_limit(storage))
}

fn ar_model_routes(storage: &StorageConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::ar_model::upload_ar_model))
        .routes(routes!(handlers::ar_model::cleanup_ar_models))
        .routes(routes!(
            handlers::ar_model::get_ar_model_info,
            handlers::ar_model::delete_ar_model
        ))
        .layer(handlers::ar_model::ar_model_body_limit(storage))
}

fn tracking_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::tracking::track_ar_usage))
}
