pub mod ar_model;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::ar_model::{AR_MODEL_DIR, IMAGE_DIR};
use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Luna Furniture Storefront API",
        version = "1.0.0",
        description = "Product catalog and AR model management for the Luna furniture storefront"
    ),
    tags(
        (name = "Products", description = "Product CRUD with image and AR model uploads"),
        (name = "AR Models", description = "Stored GLB/USDZ model management and orphan cleanup"),
        (name = "AR Tracking", description = "Client-side AR usage events"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let mut router = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    // Serve the public asset directories when the disk is exposed under a
    // local path. Anything else under the root (staging files) stays private.
    let storage = &state.config.storage;
    if storage.public_url.starts_with('/') && storage.public_url.len() > 1 {
        let base = storage.public_url.trim_end_matches('/');
        for dir in [AR_MODEL_DIR, IMAGE_DIR] {
            router = router.nest_service(
                &format!("{base}/{dir}"),
                ServeDir::new(storage.root.join(dir)),
            );
        }
    }

    let cors = cors_layer(&state.config.server.cors);
    router
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
