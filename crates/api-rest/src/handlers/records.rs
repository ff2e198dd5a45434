//! Medical record endpoints.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::listings::MedicalRecordView;
use hms_core::models::MedicalRecord;
use hms_core::store::NewMedicalRecord;
use hms_core::ListQuery;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createmedicalrecord",
    request_body = NewMedicalRecord,
    responses(
        (status = 201, description = "Medical record created", body = MedicalRecord),
        (status = 404, description = "Appointment, patient, or doctor not found"),
        (status = 422, description = "Validation failed")
    )
)]
/// Files a medical record against an appointment.
#[axum::debug_handler]
pub async fn create_medical_record(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewMedicalRecord>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<MedicalRecord>>)> {
    let record = state.store().create_medical_record(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(
            "Medical record created successfully.",
            record,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/getmedicalrecords",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated medical record list", body = [MedicalRecordView])
    )
)]
/// Lists non-archived medical records with party names resolved.
///
/// `search` matches patient name, doctor name, and diagnosis.
#[axum::debug_handler]
pub async fn get_medical_records(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<MedicalRecordView>>>> {
    let (records, pagination) = state.listings().medical_records(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Medical records retrieved successfully.",
        records,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getmedicalrecords/{id}",
    params(("id" = i64, Path, description = "Medical record id")),
    responses(
        (status = 200, description = "Medical record detail", body = MedicalRecordView),
        (status = 404, description = "Medical record not found")
    )
)]
/// Fetches one medical record, archived or not.
#[axum::debug_handler]
pub async fn get_medical_record(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<MedicalRecordView>>> {
    let record = state.listings().medical_record(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Medical record retrieved successfully.",
        record,
    )))
}

#[utoipa::path(
    delete,
    path = "/deletemedicalrecord/{id}",
    params(("id" = i64, Path, description = "Medical record id")),
    responses(
        (status = 200, description = "Medical record archived"),
        (status = 404, description = "Medical record not found")
    )
)]
/// Archives a medical record.
#[axum::debug_handler]
pub async fn delete_medical_record(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.store().archive_medical_record(id).await?;
    Ok(Json(ApiEnvelope::ok_message(
        "Medical record archived successfully.",
    )))
}
