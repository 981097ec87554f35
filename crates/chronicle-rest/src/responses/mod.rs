//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chronicle_core::{ChronicleError, ErrorResponse};
use serde::Serialize;

/// Application error type for Axum.
///
/// Wraps [`ChronicleError`] so handlers can use `?` and still produce a
/// JSON body with the right status code. Infrastructure errors are
/// serialized through [`ErrorResponse::from_error`], which replaces their
/// detail with a generic message before it reaches the wire.
#[derive(Debug)]
pub struct AppError(pub ChronicleError);

impl From<ChronicleError> for AppError {
    fn from(err: ChronicleError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(ErrorResponse::from_error(&self.0));

        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Helper to create a success response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Helper to create a created (201) response.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}
