//! Translation of core errors into enveloped HTTP responses.

use api_shared::ApiEnvelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use hms_core::HmsError;

/// Wrapper that lets handlers bubble core errors with `?`.
///
/// Client-caused failures keep their message; database failures are logged
/// and flattened to a generic 500 so internals never leak to the client.
pub struct ApiError(pub HmsError);

impl From<HmsError> for ApiError {
    fn from(err: HmsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope): (StatusCode, ApiEnvelope<()>) = match self.0 {
            HmsError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiEnvelope::err("Validation failed.", Some(format!("{field}: {message}"))),
            ),
            HmsError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ApiEnvelope::err(message, None))
            }
            HmsError::Conflict(message) => {
                (StatusCode::CONFLICT, ApiEnvelope::err(message, None))
            }
            HmsError::Unauthorized(message) => {
                (StatusCode::FORBIDDEN, ApiEnvelope::err(message, None))
            }
            HmsError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiEnvelope::err("Something went wrong on our end.", None),
                )
            }
        };
        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
