// ABOUTME: HTTP API layer for DocuApp providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod db;
pub mod documents_handlers;
pub mod health;
pub mod journal_handlers;
pub mod pagination;
pub mod response;
pub mod topman_handlers;
pub mod users_handlers;

pub use auth::{AdminUser, CurrentUser, USER_ID_HEADER};
pub use db::DbState;
pub use response::ApiResponse;

/// Creates the journal API router
pub fn create_journal_router() -> Router<DbState> {
    Router::new()
        .route("/dashboard", get(journal_handlers::dashboard))
        .route(
            "/entries",
            get(journal_handlers::list_entries).post(journal_handlers::create_entry),
        )
        .route(
            "/entries/{id}",
            get(journal_handlers::get_entry).put(journal_handlers::update_entry),
        )
        .route(
            "/entries/{id}/comments",
            get(journal_handlers::list_comments).post(journal_handlers::add_comment),
        )
        .route(
            "/departments",
            get(journal_handlers::list_departments).post(journal_handlers::create_department),
        )
        .route("/summary", get(journal_handlers::summary))
        .route("/summary/export", get(journal_handlers::export_summary))
}

/// Creates the top-management API router
pub fn create_topman_router() -> Router<DbState> {
    Router::new()
        .route(
            "/reports",
            get(topman_handlers::list_reports).post(topman_handlers::create_report),
        )
        .route(
            "/reports/{id}",
            get(topman_handlers::get_report)
                .put(topman_handlers::update_report)
                .delete(topman_handlers::delete_report),
        )
        .route("/tagging", get(topman_handlers::tagging_interface))
        .route("/tags", post(topman_handlers::tag_item))
        .route("/summary", get(topman_handlers::weekly_summary))
}

/// Creates the documents API router
pub fn create_documents_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(documents_handlers::list_documents).post(documents_handlers::create_document),
        )
        .route("/history", get(documents_handlers::list_history))
        .route("/settings", get(documents_handlers::settings_dashboard))
        .route(
            "/settings/templates",
            get(documents_handlers::list_templates).post(documents_handlers::create_template),
        )
        .route(
            "/settings/letterheads",
            get(documents_handlers::list_letterheads).post(documents_handlers::create_letterhead),
        )
        .route(
            "/settings/types",
            get(documents_handlers::list_document_types)
                .post(documents_handlers::create_document_type),
        )
        .route(
            "/settings/signatories",
            get(documents_handlers::list_signatories).post(documents_handlers::create_signatory),
        )
        .route(
            "/settings/qrcodes",
            get(documents_handlers::list_qr_codes).post(documents_handlers::create_qr_code),
        )
        .route(
            "/{id}",
            get(documents_handlers::get_document)
                .put(documents_handlers::update_document)
                .delete(documents_handlers::delete_document),
        )
        .route("/{id}/history", get(documents_handlers::document_history))
        .route("/{id}/export", get(documents_handlers::export_document))
        .route("/{id}/email", post(documents_handlers::email_document))
}

/// Creates the users API router
pub fn create_users_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(users_handlers::list_users).post(users_handlers::create_user),
        )
        .route("/me", get(users_handlers::get_current_user))
        .route("/stats", get(users_handlers::user_stats))
        .route(
            "/{id}",
            get(users_handlers::get_user)
                .put(users_handlers::update_user)
                .delete(users_handlers::delete_user),
        )
        .route("/{id}/toggle-active", post(users_handlers::toggle_active))
        .route("/{id}/reset-password", post(users_handlers::reset_password))
}

/// The full `/api` surface bound to `state`, with request tracing
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/journal", create_journal_router())
        .nest("/api/topman", create_topman_router())
        .nest("/api/documents", create_documents_router())
        .nest("/api/users", create_users_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
