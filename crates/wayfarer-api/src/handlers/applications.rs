//! Application form endpoints: Submit, Patch, Review, and the booking-level
//! process gate, for the main applicant and dependants.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfarer_core::models::{
    ApplicationForm, ApplicationFormPatch, BookingResponse, DependantResponse, ReviewDecision,
};
use wayfarer_services::ProcessGateAction;

use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    #[schema(value_type = String, example = "accepted")]
    pub decision: ReviewDecision,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessGateRequest {
    #[schema(value_type = String, example = "close")]
    pub action: ProcessGateAction,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/application",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = ApplicationForm,
    responses(
        (status = 200, description = "Application submitted", body = BookingResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Application reviewed or process closed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, form), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn submit_main_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(form): Json<ApplicationForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state
        .applications
        .submit_main(&caller_ctx.0, id, form)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/application",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = ApplicationFormPatch,
    responses(
        (status = 200, description = "Application updated", body = BookingResponse),
        (status = 409, description = "Application reviewed or process closed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, patch), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn patch_main_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<ApplicationFormPatch>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state
        .applications
        .patch_main(&caller_ctx.0, id, patch)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/application/review",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review recorded", body = BookingResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn review_main_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state
        .applications
        .review_main(&caller_ctx.0, id, request.decision)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/application/process",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = ProcessGateRequest,
    responses(
        (status = 200, description = "Process gate updated", body = BookingResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn set_process_gate(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessGateRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state
        .applications
        .set_process_gate(&caller_ctx.0, id, request.action)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dependants/{id}/application",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Dependant ID")),
    request_body = ApplicationForm,
    responses(
        (status = 200, description = "Application submitted", body = DependantResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Application reviewed or process closed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, form), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn submit_dependant_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(form): Json<ApplicationForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let dependant = state
        .applications
        .submit_dependant(&caller_ctx.0, id, form)
        .await?;
    Ok(Json(DependantResponse::from(dependant)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/dependants/{id}/application",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Dependant ID")),
    request_body = ApplicationFormPatch,
    responses(
        (status = 200, description = "Application updated", body = DependantResponse),
        (status = 409, description = "Application reviewed or process closed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, patch), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn patch_dependant_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<ApplicationFormPatch>,
) -> Result<impl IntoResponse, HttpAppError> {
    let dependant = state
        .applications
        .patch_dependant(&caller_ctx.0, id, patch)
        .await?;
    Ok(Json(DependantResponse::from(dependant)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dependants/{id}/application/review",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Dependant ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review recorded", body = DependantResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn review_dependant_application(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let dependant = state
        .applications
        .review_dependant(&caller_ctx.0, id, request.decision)
        .await?;
    Ok(Json(DependantResponse::from(dependant)))
}
