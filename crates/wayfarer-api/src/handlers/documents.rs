//! Document attach/detach endpoints.
//!
//! Attach is a multipart upload with three fields: `file` (the payload),
//! `document_type` (`personal_passport_picture`, `international_passport`,
//! or `supporting_document`), and `name` (required for supporting
//! documents). Detach accepts either the document id or its storage key.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use wayfarer_core::models::{DocumentResponse, DocumentType};
use wayfarer_core::AppError;
use wayfarer_services::DocumentUpload;

use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

struct ParsedAttachment {
    document_type: DocumentType,
    name: Option<String>,
    upload: DocumentUpload,
}

async fn parse_attachment(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ParsedAttachment, AppError> {
    let mut document_type: Option<DocumentType> = None;
    let mut name: Option<String> = None;
    let mut upload: Option<DocumentUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("document_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid document_type: {}", e)))?;
                document_type = Some(value.parse()?);
            }
            Some("name") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid name: {}", e)))?;
                if !value.trim().is_empty() {
                    name = Some(value);
                }
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("document")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?
                    .to_vec();
                upload = Some(DocumentUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let document_type = document_type
        .ok_or_else(|| AppError::Validation("A document_type field is required".to_string()))?;
    let upload =
        upload.ok_or_else(|| AppError::Validation("A file field is required".to_string()))?;

    let max_size = state.config.max_document_size_bytes();
    if upload.data.len() > max_size {
        return Err(AppError::Validation(format!(
            "Document exceeds the maximum size of {} bytes",
            max_size
        )));
    }
    if upload.data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    let allowed = state.config.document_allowed_content_types();
    if !allowed.iter().any(|t| t == &upload.content_type) {
        return Err(AppError::Validation(format!(
            "Content type {} is not allowed",
            upload.content_type
        )));
    }

    Ok(ParsedAttachment {
        document_type,
        name,
        upload,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/documents",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document attached", body = DocumentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 502, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, multipart), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn attach_booking_document(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let parsed = parse_attachment(&state, multipart).await?;
    let document = state
        .documents
        .attach_to_booking(
            &caller_ctx.0,
            id,
            parsed.document_type,
            parsed.name,
            parsed.upload,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}/documents/{document_ref}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Booking ID"),
        ("document_ref" = String, Path, description = "Document ID or storage key")
    ),
    responses(
        (status = 204, description = "Document detached"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(booking_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn detach_booking_document(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path((id, document_ref)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .documents
        .detach_from_booking(&caller_ctx.0, id, &document_ref)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/dependants/{id}/documents",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Dependant ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document attached", body = DocumentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 502, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx, multipart), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn attach_dependant_document(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let parsed = parse_attachment(&state, multipart).await?;
    let document = state
        .documents
        .attach_to_dependant(
            &caller_ctx.0,
            id,
            parsed.document_type,
            parsed.name,
            parsed.upload,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dependants/{id}/documents/{document_ref}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Dependant ID"),
        ("document_ref" = String, Path, description = "Document ID or storage key")
    ),
    responses(
        (status = 204, description = "Document detached"),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, caller_ctx), fields(dependant_id = %id, user_id = %caller_ctx.0.user_id))]
pub async fn detach_dependant_document(
    State(state): State<Arc<AppState>>,
    caller_ctx: CallerContext,
    Path((id, document_ref)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .documents
        .detach_from_dependant(&caller_ctx.0, id, &document_ref)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
