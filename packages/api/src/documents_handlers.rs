// ABOUTME: HTTP request handlers for document generation
// ABOUTME: Owner-scoped documents, export and email actions, history, and catalog settings

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use docuapp_documents::{
    DocumentFilter, DocumentInput, DocumentTypeCreateInput, EmailRequest, HistoryFilter,
    LetterheadCreateInput, QrCodeCreateInput, SignatoryCreateInput, TemplateCreateInput,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::auth::{AdminUser, CurrentUser};
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{created_or_error, ok_or_error, ApiError};

pub const HISTORY_PAGE_SIZE: i64 = 20;

/// `?active=true` restricts catalog listings to active records
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "docuapp_core::lenient_or_default")]
    pub active: bool,
}

pub async fn list_documents(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<DocumentFilter>,
) -> impl IntoResponse {
    info!(
        "Listing documents for {} (page: {})",
        user.id(),
        pagination.page()
    );

    let result = db
        .document_storage
        .list_documents_paginated(
            user.id(),
            &filter,
            Some(pagination.limit()),
            Some(pagination.offset()),
        )
        .await
        .map(|(documents, total)| PaginatedResponse::new(documents, &pagination, total));

    ok_or_error(result, "Failed to list documents")
}

pub async fn create_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<DocumentInput>,
) -> impl IntoResponse {
    info!("Creating document '{}' for {}", input.title, user.id());

    let result = db.document_storage.create_document(user.id(), input).await;
    created_or_error(result, "Failed to create document")
}

pub async fn get_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting document: {}", id);

    let result = db.document_storage.get_document(&id, user.id()).await;
    ok_or_error(result, "Failed to get document")
}

pub async fn update_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<DocumentInput>,
) -> impl IntoResponse {
    info!("Updating document: {}", id);

    let result = db.document_storage.update_document(&id, user.id(), input).await;
    ok_or_error(result, "Failed to update document")
}

pub async fn delete_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting document: {}", id);

    let result = db
        .document_storage
        .delete_document(&id, user.id())
        .await
        .map(|_| "Document deleted successfully");
    ok_or_error(result, "Failed to delete document")
}

/// The composed HTML as an attachment
pub async fn export_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Response {
    info!("Exporting document: {}", id);

    match db.document_storage.export_document(&id, user.id()).await {
        Ok(export) => (
            [
                (header::CONTENT_TYPE, export.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename),
                ),
            ],
            export.html,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export document {}: {}", id, e);
            ApiError(e).into_response()
        }
    }
}

pub async fn email_document(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<EmailRequest>,
) -> impl IntoResponse {
    info!("Emailing document {} to {}", id, request.to);

    let result = db
        .document_storage
        .email_document(&id, user.id(), request)
        .await;
    ok_or_error(result, "Failed to email document")
}

pub async fn list_history(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<HistoryFilter>,
) -> impl IntoResponse {
    let pagination = pagination.with_default_limit(HISTORY_PAGE_SIZE);

    let result = db
        .document_storage
        .list_history_paginated(
            user.id(),
            &filter,
            Some(pagination.limit()),
            Some(pagination.offset()),
        )
        .await
        .map(|(entries, total)| PaginatedResponse::new(entries, &pagination, total));

    ok_or_error(result, "Failed to list document history")
}

pub async fn document_history(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting history of document: {}", id);

    let result = db.document_storage.list_document_history(&id, user.id()).await;
    ok_or_error(result, "Failed to get document history")
}

// Settings

pub async fn settings_dashboard(State(db): State<DbState>, _user: CurrentUser) -> impl IntoResponse {
    let result = db.catalog_storage.settings_counts().await;
    ok_or_error(result, "Failed to load document settings")
}

pub async fn list_templates(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let result = db.catalog_storage.list_templates(query.active).await;
    ok_or_error(result, "Failed to list templates")
}

pub async fn create_template(
    State(db): State<DbState>,
    admin: AdminUser,
    Json(input): Json<TemplateCreateInput>,
) -> impl IntoResponse {
    info!("Creating template '{}'", input.name);

    let result = db.catalog_storage.create_template(admin.id(), input).await;
    created_or_error(result, "Failed to create template")
}

pub async fn list_letterheads(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let result = db.catalog_storage.list_letterheads(query.active).await;
    ok_or_error(result, "Failed to list letterheads")
}

pub async fn create_letterhead(
    State(db): State<DbState>,
    _admin: AdminUser,
    Json(input): Json<LetterheadCreateInput>,
) -> impl IntoResponse {
    info!("Creating letterhead '{}'", input.name);

    let result = db.catalog_storage.create_letterhead(input).await;
    created_or_error(result, "Failed to create letterhead")
}

pub async fn list_document_types(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let result = db.catalog_storage.list_document_types(query.active).await;
    ok_or_error(result, "Failed to list document types")
}

pub async fn create_document_type(
    State(db): State<DbState>,
    _admin: AdminUser,
    Json(input): Json<DocumentTypeCreateInput>,
) -> impl IntoResponse {
    info!("Creating document type '{}'", input.name);

    let result = db.catalog_storage.create_document_type(input).await;
    created_or_error(result, "Failed to create document type")
}

pub async fn list_signatories(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let result = db.catalog_storage.list_signatories(query.active).await;
    ok_or_error(result, "Failed to list signatories")
}

pub async fn create_signatory(
    State(db): State<DbState>,
    _admin: AdminUser,
    Json(input): Json<SignatoryCreateInput>,
) -> impl IntoResponse {
    info!("Creating signatory '{}'", input.name);

    let result = db.catalog_storage.create_signatory(input).await;
    created_or_error(result, "Failed to create signatory")
}

pub async fn list_qr_codes(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let result = db.catalog_storage.list_qr_codes(query.active).await;
    ok_or_error(result, "Failed to list QR codes")
}

pub async fn create_qr_code(
    State(db): State<DbState>,
    _admin: AdminUser,
    Json(input): Json<QrCodeCreateInput>,
) -> impl IntoResponse {
    info!("Creating QR code '{}'", input.name);

    let result = db.catalog_storage.create_qr_code(input).await;
    created_or_error(result, "Failed to create QR code")
}
