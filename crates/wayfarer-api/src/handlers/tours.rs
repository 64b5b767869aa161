use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use wayfarer_core::models::TourResponse;
use wayfarer_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/tours",
    tag = "tours",
    responses(
        (status = 200, description = "Available tour packages", body = [TourResponse])
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_tours(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tours = state.tours.list().await?;
    let responses: Vec<TourResponse> = tours.into_iter().map(TourResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}",
    tag = "tours",
    params(("id" = Uuid, Path, description = "Tour ID")),
    responses(
        (status = 200, description = "Tour", body = TourResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(tour_id = %id))]
pub async fn get_tour(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tour = state
        .tours
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;
    Ok(Json(TourResponse::from(tour)))
}
