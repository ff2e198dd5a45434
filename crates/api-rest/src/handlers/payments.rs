//! Payment endpoints, including confirmation.

use api_shared::ApiEnvelope;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use hms_core::listings::PaymentView;
use hms_core::models::Payment;
use hms_core::store::NewPayment;
use hms_core::ListQuery;

use crate::auth::AuthedIdentity;
use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/createpayment",
    request_body = NewPayment,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 404, description = "Patient or appointment not found"),
        (status = 422, description = "Validation failed")
    )
)]
/// Records a pending payment against a patient, optionally tied to an
/// appointment.
#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Json(req): Json<NewPayment>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope<Payment>>)> {
    let payment = state.store().create_payment(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Payment created successfully.", payment)),
    ))
}

#[utoipa::path(
    get,
    path = "/getpayments",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated payment list", body = [PaymentView])
    )
)]
/// Lists non-archived payments with patient and appointment context.
///
/// `search` matches patient name, appointment date, amount, and status.
#[axum::debug_handler]
pub async fn get_payments(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<PaymentView>>>> {
    let (payments, pagination) = state.listings().payments(&query).await?;
    Ok(Json(ApiEnvelope::ok_paginated(
        "Payments retrieved successfully.",
        payments,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/getpayments/{id}",
    params(("id" = i64, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment detail", body = PaymentView),
        (status = 404, description = "Payment not found or archived")
    )
)]
/// Fetches one payment. Archived payments are hidden.
#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<PaymentView>>> {
    let payment = state.listings().payment(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Payment retrieved successfully.",
        payment,
    )))
}

#[utoipa::path(
    post,
    path = "/confirmpayment/{id}",
    params(("id" = i64, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment confirmed", body = Payment),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment already paid or archived")
    )
)]
/// Confirms a pending payment as paid.
///
/// Confirmation is one-way: it stamps the payment date and flags the linked
/// appointment as paid.
#[axum::debug_handler]
pub async fn confirm_payment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<Payment>>> {
    let payment = state.store().confirm_payment(id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Payment confirmed successfully.",
        payment,
    )))
}

#[utoipa::path(
    delete,
    path = "/deletepayment/{id}",
    params(("id" = i64, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment archived"),
        (status = 404, description = "Payment not found")
    )
)]
/// Archives a payment. Archived payments drop out of earnings totals.
#[axum::debug_handler]
pub async fn delete_payment(
    State(state): State<AppState>,
    _identity: AuthedIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    state.store().archive_payment(id).await?;
    Ok(Json(ApiEnvelope::ok_message(
        "Payment archived successfully.",
    )))
}
