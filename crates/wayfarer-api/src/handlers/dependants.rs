use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use wayfarer_core::models::{DependantDraft, DependantResponse};

use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDependantRequest {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub passport_number: Option<String>,
    /// Profile template to copy fields from; explicit fields above win.
    pub profile_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/dependants",
    tag = "dependants",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = AddDependantRequest,
    responses(
        (status = 201, description = "Dependant added", body = DependantResponse),
        (status = 400, description = "Validation failed or no remaining slots", body = ErrorResponse),
        (status = 409, description = "Application process closed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn add_dependant(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AddDependantRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let draft = DependantDraft {
        name: request.name,
        relationship: request.relationship,
        date_of_birth: request.date_of_birth,
        passport_number: request.passport_number,
    };
    let dependant = state
        .roster
        .add_dependant(&caller_ctx.0, id, draft, request.profile_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DependantResponse::from(dependant))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}/dependants",
    tag = "dependants",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Dependants on the booking", body = [DependantResponse])
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn list_dependants(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let dependants = state.roster.list_dependants(&caller_ctx.0, id).await?;
    let responses: Vec<DependantResponse> =
        dependants.into_iter().map(DependantResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dependants/{id}",
    tag = "dependants",
    params(("id" = Uuid, Path, description = "Dependant ID")),
    responses(
        (status = 204, description = "Dependant removed"),
        (status = 404, description = "Dependant not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn remove_dependant(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.roster.remove_dependant(&caller_ctx.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
