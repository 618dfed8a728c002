use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-side AR interaction being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArUsageAction {
    ModelLoaded,
    ArSessionStarted,
    ArObjectPlaced,
    ScreenshotTaken,
    ModelError,
}

impl ArUsageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelLoaded => "model_loaded",
            Self::ArSessionStarted => "ar_session_started",
            Self::ArObjectPlaced => "ar_object_placed",
            Self::ScreenshotTaken => "screenshot_taken",
            Self::ModelError => "model_error",
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TrackArUsageRequest {
    pub action: ArUsageAction,
    #[schema(example = 1)]
    pub product_id: i32,
    /// Client-side event time; defaults to the time of receipt.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TrackResponse {
    #[schema(example = "tracked")]
    pub status: &'static str,
}
