//! Route configuration and setup.

use axum::{
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state)?;
    let auth_state = Arc::new(AuthState {
        jwt_secret: state.config.jwt_secret().to_string(),
    });

    let public_routes = public_routes(state.clone());
    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(auth_state, auth_middleware),
    );

    // Leave headroom above the document size limit for multipart framing.
    let body_limit = state.config.max_document_size_bytes() + 64 * 1024;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()).into_response() }),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

fn setup_cors(state: &Arc<AppState>) -> Result<CorsLayer, anyhow::Error> {
    let origins = state.config.cors_origins();
    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any)
    } else {
        let parsed: Result<Vec<HeaderValue>, _> =
            origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
        CorsLayer::new()
            .allow_origin(parsed?)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            &format!("{}/tours", API_PREFIX),
            get(handlers::tours::list_tours),
        )
        .route(
            &format!("{}/tours/{{id}}", API_PREFIX),
            get(handlers::tours::get_tour),
        )
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // bookings
        .route(
            &format!("{}/bookings", API_PREFIX),
            post(handlers::bookings::create_booking).get(handlers::bookings::list_bookings),
        )
        .route(
            &format!("{}/bookings/{{id}}", API_PREFIX),
            get(handlers::bookings::get_booking),
        )
        .route(
            &format!("{}/bookings/{{id}}/payment", API_PREFIX),
            post(handlers::bookings::record_payment),
        )
        // main-applicant application
        .route(
            &format!("{}/bookings/{{id}}/application", API_PREFIX),
            post(handlers::applications::submit_main_application)
                .patch(handlers::applications::patch_main_application),
        )
        .route(
            &format!("{}/bookings/{{id}}/application/review", API_PREFIX),
            post(handlers::applications::review_main_application),
        )
        .route(
            &format!("{}/bookings/{{id}}/application/process", API_PREFIX),
            post(handlers::applications::set_process_gate),
        )
        // booking documents
        .route(
            &format!("{}/bookings/{{id}}/documents", API_PREFIX),
            post(handlers::documents::attach_booking_document),
        )
        .route(
            &format!("{}/bookings/{{id}}/documents/{{*document_ref}}", API_PREFIX),
            delete(handlers::documents::detach_booking_document),
        )
        // dependant roster
        .route(
            &format!("{}/bookings/{{id}}/dependants", API_PREFIX),
            post(handlers::dependants::add_dependant).get(handlers::dependants::list_dependants),
        )
        .route(
            &format!("{}/dependants/{{id}}", API_PREFIX),
            delete(handlers::dependants::remove_dependant),
        )
        // dependant applications
        .route(
            &format!("{}/dependants/{{id}}/application", API_PREFIX),
            post(handlers::applications::submit_dependant_application)
                .patch(handlers::applications::patch_dependant_application),
        )
        .route(
            &format!("{}/dependants/{{id}}/application/review", API_PREFIX),
            post(handlers::applications::review_dependant_application),
        )
        // dependant documents
        .route(
            &format!("{}/dependants/{{id}}/documents", API_PREFIX),
            post(handlers::documents::attach_dependant_document),
        )
        .route(
            &format!(
                "{}/dependants/{{id}}/documents/{{*document_ref}}",
                API_PREFIX
            ),
            delete(handlers::documents::detach_dependant_document),
        )
        // dependant profiles
        .route(
            &format!("{}/profiles", API_PREFIX),
            post(handlers::profiles::create_profile).get(handlers::profiles::list_profiles),
        )
        .route(
            &format!("{}/profiles/{{id}}", API_PREFIX),
            delete(handlers::profiles::delete_profile),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
