use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use wayfarer_core::models::{DependantProfileResponse, NewDependantProfile};
use wayfarer_core::AppError;

use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/profiles",
    tag = "profiles",
    request_body = NewDependantProfile,
    responses(
        (status = 201, description = "Profile created", body = DependantProfileResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(user_id = %caller_ctx.0.user_id))]
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Json(request): Json<NewDependantProfile>,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state
        .profiles
        .create(caller_ctx.0.user_id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DependantProfileResponse::from(profile)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    tag = "profiles",
    responses(
        (status = 200, description = "The caller's dependant profiles", body = [DependantProfileResponse])
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(user_id = %caller_ctx.0.user_id))]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let profiles = state.profiles.list_for_user(caller_ctx.0.user_id).await?;
    let responses: Vec<DependantProfileResponse> = profiles
        .into_iter()
        .map(DependantProfileResponse::from)
        .collect();
    Ok(Json(responses))
}

#[utoipa::path(
    delete,
    path = "/api/v1/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 403, description = "Not the profile owner", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(profile_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let profile = state
        .profiles
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Dependant profile not found".to_string()))?;
    if profile.user_id != caller_ctx.0.user_id && !caller_ctx.0.is_admin() {
        return Err(AppError::Forbidden(
            "This dependant profile does not belong to you".to_string(),
        )
        .into());
    }

    state.profiles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
