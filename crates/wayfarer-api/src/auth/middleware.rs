use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::auth::jwt::verify_token;
use crate::auth::models::CallerContext;
use crate::error::ErrorResponse;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, "UNAUTHENTICATED")),
    )
        .into_response()
}

/// Require a valid bearer token and store the caller in request extensions.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(value) => value,
        None => return unauthorized("Missing Authorization header"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => token,
        _ => return unauthorized("Authorization header must be a Bearer token"),
    };

    let caller = match verify_token(token, &auth_state.jwt_secret) {
        Ok(caller) => caller,
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            return unauthorized("Invalid or expired token");
        }
    };

    request.extensions_mut().insert(CallerContext(caller));
    next.run(request).await
}
