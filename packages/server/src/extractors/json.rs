use std::error::Error as _;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejections become `VALIDATION_ERROR` responses.
///
/// Schema errors keep the offending field path (`action: unknown variant ...`)
/// and drop axum's generic prefix.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(describe_rejection)?;
        Ok(AppJson(value))
    }
}

fn describe_rejection(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::JsonDataError(e) => match e.source() {
            Some(inner) => format!("Invalid request body: {inner}"),
            None => rejection.body_text(),
        },
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected `Content-Type: application/json`".to_string()
        }
        _ => rejection.body_text(),
    };
    AppError::Validation(message)
}
