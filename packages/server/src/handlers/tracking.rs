use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, header};
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::product::find_product;
use crate::models::ar_model::{TrackArUsageRequest, TrackResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/track",
    tag = "AR Tracking",
    operation_id = "trackArUsage",
    summary = "Record an AR interaction",
    description = "Records a client-side AR event (model loaded, session started, object placed, \
        screenshot taken or model error) for a product as a structured log record.",
    request_body = TrackArUsageRequest,
    responses(
        (status = 200, description = "Event recorded", body = TrackResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, payload))]
pub async fn track_ar_usage(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    AppJson(payload): AppJson<TrackArUsageRequest>,
) -> Result<Json<TrackResponse>, AppError> {
    find_product(&state.db, payload.product_id).await?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let timestamp = payload.timestamp.unwrap_or_else(Utc::now);

    info!(
        product_id = payload.product_id,
        action = payload.action.as_str(),
        %timestamp,
        client_ip = %client.ip(),
        user_agent,
        "AR usage tracked"
    );

    Ok(Json(TrackResponse { status: "tracked" }))
}
