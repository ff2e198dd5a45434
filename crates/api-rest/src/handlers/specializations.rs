//! Specialization endpoints.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::models::Specialization;
use hms_core::store::NewSpecialization;
use hms_core::ListQuery;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createspecialization",
    request_body = NewSpecialization,
    responses(
        (status = 201, description = "Specialization created", body = Specialization),
        (status = 422, description = "Validation failed")
    )
)]
/// Creates a medical specialization with its common conditions.
#[axum::debug_handler]
pub async fn create_specialization(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewSpecialization>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Specialization>>)> {
    let specialization = state.store().create_specialization(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(
            "Specialization created successfully.",
            specialization,
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/getspecializations",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated specialization list", body = [Specialization])
    )
)]
/// Lists non-archived specializations alphabetically.
#[axum::debug_handler]
pub async fn get_specializations(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<Specialization>>>> {
    let (specializations, pagination) = state.listings().specializations(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Specializations retrieved successfully.",
        specializations,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getspecializations/{id}",
    params(("id" = i64, Path, description = "Specialization id")),
    responses(
        (status = 200, description = "Specialization detail", body = Specialization),
        (status = 404, description = "Specialization not found")
    )
)]
/// Fetches one specialization, archived or not.
#[axum::debug_handler]
pub async fn get_specialization(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<Specialization>>> {
    let specialization = state.store().specialization(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Specialization retrieved successfully.",
        specialization,
    )))
}

#[utoipa::path(
    delete,
    path = "/deletespecialization/{id}",
    params(("id" = i64, Path, description = "Specialization id")),
    responses(
        (status = 200, description = "Specialization archived"),
        (status = 404, description = "Specialization not found")
    )
)]
/// Archives a specialization.
#[axum::debug_handler]
pub async fn delete_specialization(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.store().archive_specialization(id).await?;
    Ok(Json(ApiEnvelope::ok_message(
        "Specialization archived successfully.",
    )))
}
