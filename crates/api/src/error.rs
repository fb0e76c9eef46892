//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_shared::AppError;
use tracing::error;

/// Error returned by every handler.
///
/// Anything convertible into [`AppError`] converts into this with `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_server_error() {
            error!(error = %err, "Request failed");
        }

        // Infrastructure details stay in the logs.
        let message = if err.is_server_error() {
            "An internal error occurred".to_string()
        } else {
            err.to_string()
        };

        let mut body = json!({
            "error": err.error_code(),
            "message": message,
        });
        if let Some(code) = err.domain_code() {
            body["code"] = json!(code);
        }
        if let Some(fields) = err.fields() {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}
