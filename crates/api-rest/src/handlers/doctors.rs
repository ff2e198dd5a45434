//! Doctor profile endpoints.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::listings::DoctorProfile;
use hms_core::store::{DoctorUpdate, NewDoctor};
use hms_core::ListQuery;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createdoctor",
    request_body = NewDoctor,
    responses(
        (status = 201, description = "Doctor created", body = DoctorProfile),
        (status = 404, description = "Specialization not found"),
        (status = 422, description = "Validation failed")
    )
)]
/// Registers a doctor with their specialization and available weekdays.
#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewDoctor>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<DoctorProfile>>)> {
    let doctor = state.store().create_doctor(req).await?;
    let profile = state.listings().doctor(doctor.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Doctor created successfully.", profile)),
    ))
}

#[utoipa::path(
    get,
    path = "/getdoctors",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated doctor list", body = [DoctorProfile])
    )
)]
/// Lists non-archived doctors with specialization and availability attached.
///
/// `search` matches name, qualifications, and specialization.
#[axum::debug_handler]
pub async fn get_doctors(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<DoctorProfile>>>> {
    let (doctors, pagination) = state.listings().doctors(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Doctors retrieved successfully.",
        doctors,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getdoctors/{id}",
    params(("id" = i64, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor detail", body = DoctorProfile),
        (status = 404, description = "Doctor not found")
    )
)]
/// Fetches one doctor, archived or not.
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<DoctorProfile>>> {
    let profile = state.listings().doctor(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Doctor retrieved successfully.",
        profile,
    )))
}

#[utoipa::path(
    put,
    path = "/updatedoctor/{id}",
    params(("id" = i64, Path, description = "Doctor id")),
    request_body = DoctorUpdate,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorProfile),
        (status = 404, description = "Doctor or specialization not found"),
        (status = 409, description = "Archived doctor or duplicate email"),
        (status = 422, description = "Validation failed")
    )
)]
/// Rewrites a doctor's profile; the available-days list is replaced wholesale.
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
    Json(req): Json<DoctorUpdate>,
) -> ApiResult<Json<ApiEnvelope<DoctorProfile>>> {
    state.store().update_doctor(id, req).await?;
    let profile = state.listings().doctor(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Doctor updated successfully.",
        profile,
    )))
}

#[utoipa::path(
    delete,
    path = "/deletedoctor/{id}",
    params(("id" = i64, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor archived"),
        (status = 404, description = "Doctor not found")
    )
)]
/// Archives a doctor. Archived doctors cannot take new bookings.
#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.store().archive_doctor(id).await?;
    Ok(Json(ApiEnvelope::ok_message("Doctor archived successfully.")))
}
