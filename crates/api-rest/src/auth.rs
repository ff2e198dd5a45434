//! Bearer-token authentication extractor.

use api_shared::{ApiEnvelope, Identity, Role};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::state::AppState;

/// The authenticated caller, resolved from the `Authorization` header.
///
/// Rejects with `401` when the header is missing, malformed, or carries a
/// token the deployment's token table does not know.
pub struct AuthedIdentity(pub Identity);

impl AuthedIdentity {
    /// Requires the caller to hold the given role, otherwise `403`.
    pub fn require_role(&self, role: Role) -> Result<(), crate::error::ApiError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(hms_core::HmsError::Unauthorized(
                "You do not have permission to access this resource.".into(),
            )
            .into())
        }
    }
}

fn unauthorized() -> Response {
    let envelope: ApiEnvelope<()> =
        ApiEnvelope::err("Authentication required.", Some("invalid or missing bearer token".into()));
    (StatusCode::UNAUTHORIZED, Json(envelope)).into_response()
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthedIdentity {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(unauthorized)?;

        state
            .tokens
            .resolve(token)
            .map(AuthedIdentity)
            .ok_or_else(unauthorized)
    }
}
