//! Appointment lifecycle endpoints.
//!
//! These routes drive the core scheduling engine: booking with conflict
//! detection, the status machine, soft archival and restore.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::models::{AppointmentDetail, AppointmentListItem};
use hms_core::scheduler::{AppointmentUpdate, NewAppointment};
use hms_core::{ListQuery, RestoreOutcome};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for rejecting an appointment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectAppointmentReq {
    /// Recorded in the appointment's notes; a default is substituted when
    /// absent or blank.
    pub reason: Option<String>,
}

#[utoipa::path(
    post,
    path = "/createappointment",
    request_body = NewAppointment,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentDetail),
        (status = 404, description = "Patient or doctor not found"),
        (status = 409, description = "Slot or patient-day conflict"),
        (status = 422, description = "Validation failed")
    )
)]
/// Books a new appointment.
///
/// The appointment starts `Pending`. Booking fails with a conflict when the
/// doctor's slot is taken or the patient already holds an active
/// appointment that day.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewAppointment>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<AppointmentDetail>>)> {
    let detail = state.scheduler().create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Appointment created successfully.", detail)),
    ))
}

#[utoipa::path(
    get,
    path = "/getappointments",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated appointment list", body = [AppointmentListItem])
    )
)]
/// Lists non-archived appointments, newest date first.
///
/// `search` matches patient name, doctor name, date, and status.
#[axum::debug_handler]
pub async fn get_appointments(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<AppointmentListItem>>>> {
    let (items, pagination) = state.scheduler().list(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Appointments retrieved successfully.",
        items,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getappointments/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment detail", body = AppointmentDetail),
        (status = 404, description = "Appointment not found")
    )
)]
/// Fetches one appointment with its associations, archived or not.
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().get(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment retrieved successfully.",
        detail,
    )))
}

#[utoipa::path(
    put,
    path = "/updateappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = AppointmentUpdate,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "New slot conflicts or appointment archived"),
        (status = 422, description = "Validation failed")
    )
)]
/// Reschedules an appointment or edits its clinical details.
///
/// The new slot goes through the same conflict checks as booking, with the
/// appointment itself excluded.
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
    Json(req): Json<AppointmentUpdate>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().update_details(id, req).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment updated successfully.",
        detail,
    )))
}

#[utoipa::path(
    delete,
    path = "/deleteappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment archived"),
        (status = 404, description = "Appointment not found")
    )
)]
/// Archives an appointment (soft delete).
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.scheduler().archive(id).await?;
    Ok(Json(ApiEnvelope::ok_message(
        "Appointment archived successfully.",
    )))
}

#[utoipa::path(
    post,
    path = "/restoreappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment restored", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Slot was retaken while archived")
    )
)]
/// Restores an archived appointment.
///
/// Restoring re-enters the conflict constraints, so it fails with a
/// conflict if the slot was retaken in the meantime. Restoring an active
/// appointment is a no-op.
#[axum::debug_handler]
pub async fn restore_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let scheduler = state.scheduler();
    let outcome = scheduler.restore(id).await?;
    let detail = scheduler.get(id).await?;
    let message = match outcome {
        RestoreOutcome::Restored => "Appointment restored successfully.",
        RestoreOutcome::AlreadyActive => "Appointment is already active.",
    };
    Ok(Json(ApiEnvelope::ok(message, detail)))
}

#[utoipa::path(
    post,
    path = "/approveappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment approved", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not pending")
    )
)]
/// Approves a pending appointment.
#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().approve(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment approved successfully.",
        detail,
    )))
}

#[utoipa::path(
    post,
    path = "/rejectappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = RejectAppointmentReq,
    responses(
        (status = 200, description = "Appointment rejected", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not pending")
    )
)]
/// Rejects a pending appointment, recording the reason in its notes.
#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
    Json(req): Json<RejectAppointmentReq>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().reject(id, req.reason).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment rejected successfully.",
        detail,
    )))
}

#[utoipa::path(
    post,
    path = "/completeappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not approved")
    )
)]
/// Marks an approved appointment as completed.
#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().complete(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment completed successfully.",
        detail,
    )))
}

#[utoipa::path(
    post,
    path = "/cancelappointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentDetail),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not pending or approved")
    )
)]
/// Cancels a pending or approved appointment.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<AppointmentDetail>>> {
    let detail = state.scheduler().cancel(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Appointment cancelled successfully.",
        detail,
    )))
}
