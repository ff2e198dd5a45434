//! Dashboard endpoints, gated by role.

use api_shared::{ApiEnvelope, Role};
use axum::extract::State;
use axum::response::Json;
use hms_core::reporting::{AdminDashboard, DoctorDashboard};

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/admindashboard",
    responses(
        (status = 200, description = "System-wide dashboard", body = AdminDashboard),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    )
)]
/// System-wide totals, the latest appointments, and the top doctors.
///
/// Admin only.
#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    identity: AuthedIdentity,
) -> ApiResult<Json<ApiEnvelope<AdminDashboard>>> {
    identity.require_role(Role::Admin)?;
    let dashboard = state.reporting().admin_summary().await?;
    Ok(Json(ApiEnvelope::ok(
        "Dashboard retrieved successfully.",
        dashboard,
    )))
}

#[utoipa::path(
    get,
    path = "/doctordashboard",
    responses(
        (status = 200, description = "Doctor-scoped dashboard", body = DoctorDashboard),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a doctor"),
        (status = 404, description = "Doctor record not found")
    )
)]
/// The calling doctor's own workload and earnings summary.
///
/// Doctor only; the doctor id comes from the resolved identity, never from
/// the request.
#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<AppState>,
    identity: AuthedIdentity,
) -> ApiResult<Json<ApiEnvelope<DoctorDashboard>>> {
    identity.require_role(Role::Doctor)?;
    let dashboard = state.reporting().doctor_summary(identity.0.user_id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Dashboard retrieved successfully.",
        dashboard,
    )))
}
