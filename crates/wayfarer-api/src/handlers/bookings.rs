use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use wayfarer_core::models::{BookingResponse, NewBooking};
use wayfarer_services::PaymentOutcome;

use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    pub tour_id: Uuid,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "Customer email must be a valid email address"))]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    #[validate(range(min = 1, message = "Number of travelers must be at least 1"))]
    pub number_of_travelers: i32,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[schema(value_type = String, example = "paid")]
    pub outcome: PaymentOutcome,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "bookings",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(user_id = %caller_ctx.0.user_id))]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(wayfarer_core::AppError::from)?;

    let booking = state
        .bookings
        .checkout(
            &caller_ctx.0,
            NewBooking {
                tour_id: request.tour_id,
                user_id: None,
                customer_name: request.customer_name,
                customer_email: request.customer_email,
                customer_phone: request.customer_phone,
                number_of_travelers: request.number_of_travelers,
                special_requests: request.special_requests,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "bookings",
    responses(
        (status = 200, description = "Bookings visible to the caller", body = [BookingResponse])
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(user_id = %caller_ctx.0.user_id))]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let bookings = state.bookings.list_bookings(&caller_ctx.0).await?;
    let responses: Vec<BookingResponse> = bookings.into_iter().map(BookingResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = BookingResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state.bookings.get_booking(&caller_ctx.0, id).await?;
    Ok(Json(BookingResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/payment",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment status recorded", body = BookingResponse),
        (status = 400, description = "Payment already processed", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, request), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    Json(request): Json<PaymentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let booking = state
        .bookings
        .record_payment(&caller_ctx.0, id, request.outcome)
        .await?;
    Ok(Json(BookingResponse::from(booking)))
}
