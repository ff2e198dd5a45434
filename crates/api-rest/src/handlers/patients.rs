//! Patient profile endpoints.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::listings::PatientProfile;
use hms_core::store::NewPatient;
use hms_core::ListQuery;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createpatient",
    request_body = NewPatient,
    responses(
        (status = 201, description = "Patient created", body = PatientProfile),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed")
    )
)]
/// Registers a patient. Email must be unique among all patients.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewPatient>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<PatientProfile>>)> {
    let patient = state.store().create_patient(req).await?;
    let profile = state.listings().patient(patient.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Patient created successfully.", profile)),
    ))
}

#[utoipa::path(
    get,
    path = "/getpatients",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated patient list", body = [PatientProfile])
    )
)]
/// Lists non-archived patients.
///
/// `search` matches name, email, and phone number.
#[axum::debug_handler]
pub async fn get_patients(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<PatientProfile>>>> {
    let (patients, pagination) = state.listings().patients(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Patients retrieved successfully.",
        patients,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getpatients/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient detail", body = PatientProfile),
        (status = 404, description = "Patient not found")
    )
)]
/// Fetches one patient, archived or not.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<PatientProfile>>> {
    let profile = state.listings().patient(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Patient retrieved successfully.",
        profile,
    )))
}

#[utoipa::path(
    delete,
    path = "/deletepatient/{id}",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient archived"),
        (status = 404, description = "Patient not found")
    )
)]
/// Archives a patient. Archived patients cannot book appointments.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.store().archive_patient(id).await?;
    Ok(Json(ApiEnvelope::ok_message(
        "Patient archived successfully.",
    )))
}
