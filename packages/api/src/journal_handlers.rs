// ABOUTME: HTTP request handlers for weekly journals
// ABOUTME: Dashboard, entries, comments, departments, and the consolidated summary report

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use docuapp_journal::{
    build_summary_report, export_summary_csv, CommentCreateInput, DepartmentCreateInput,
    JournalComment, JournalFilter, JournalInput, SummaryFilter, WeeklyJournal, CSV_FILENAME,
};
use docuapp_storage::StorageError;
use serde::Serialize;
use tracing::{error, info};

use crate::auth::{AdminUser, CurrentUser};
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{created_or_error, ok_or_error, ApiError};

#[derive(Serialize)]
pub struct JournalDetail {
    pub journal: WeeklyJournal,
    pub comments: Vec<JournalComment>,
}

pub async fn dashboard(State(db): State<DbState>, user: CurrentUser) -> impl IntoResponse {
    info!("Building journal dashboard for {}", user.id());

    let result = db.journal_storage.dashboard(user.id()).await;
    ok_or_error(result, "Failed to build journal dashboard")
}

pub async fn list_entries(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<JournalFilter>,
) -> impl IntoResponse {
    info!("Listing journal entries (page: {})", pagination.page());

    let result = db
        .journal_storage
        .list_journals_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(entries, total)| PaginatedResponse::new(entries, &pagination, total));

    ok_or_error(result, "Failed to list journal entries")
}

pub async fn create_entry(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<JournalInput>,
) -> impl IntoResponse {
    info!(
        "Creating journal entry for {} ({} to {})",
        user.id(),
        input.date_from,
        input.date_to
    );

    let result = db.journal_storage.create_journal(user.id(), input).await;
    created_or_error(result, "Failed to create journal entry")
}

pub async fn get_entry(
    State(db): State<DbState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting journal entry: {}", id);

    let result = async {
        let journal = db.journal_storage.get_journal(&id).await?;
        let comments = db.journal_storage.list_comments(&id).await?;
        Ok::<_, StorageError>(JournalDetail { journal, comments })
    }
    .await;

    ok_or_error(result, "Failed to get journal entry")
}

pub async fn update_entry(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<JournalInput>,
) -> impl IntoResponse {
    info!("Updating journal entry: {}", id);

    let result = db.journal_storage.update_journal(&id, user.id(), input).await;
    ok_or_error(result, "Failed to update journal entry")
}

pub async fn list_comments(
    State(db): State<DbState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let result = async {
        db.journal_storage.get_journal(&id).await?;
        db.journal_storage.list_comments(&id).await
    }
    .await;

    ok_or_error(result, "Failed to list comments")
}

pub async fn add_comment(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<CommentCreateInput>,
) -> impl IntoResponse {
    info!("Adding comment to journal entry: {}", id);

    let result = db.journal_storage.add_comment(&id, user.id(), input).await;
    created_or_error(result, "Failed to add comment")
}

pub async fn list_departments(State(db): State<DbState>, _user: CurrentUser) -> impl IntoResponse {
    let result = db.journal_storage.list_departments().await;
    ok_or_error(result, "Failed to list departments")
}

pub async fn create_department(
    State(db): State<DbState>,
    admin: AdminUser,
    Json(input): Json<DepartmentCreateInput>,
) -> impl IntoResponse {
    info!("Creating department '{}' (by {})", input.name, admin.id());

    let result = db.journal_storage.create_department(input).await;
    created_or_error(result, "Failed to create department")
}

pub async fn summary(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(filter): Query<SummaryFilter>,
) -> impl IntoResponse {
    info!("Building journal summary report");

    let today = Utc::now().date_naive();
    let result = build_summary_report(&db.journal_storage, &filter, today).await;
    ok_or_error(result, "Failed to build summary report")
}

/// The summary's entries as a CSV download
pub async fn export_summary(
    State(db): State<DbState>,
    _user: CurrentUser,
    Query(filter): Query<SummaryFilter>,
) -> Response {
    info!("Exporting journal summary report as CSV");

    let today = Utc::now().date_naive();
    match export_summary_csv(&db.journal_storage, &filter, today).await {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_FILENAME),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export summary report: {}", e);
            ApiError(e).into_response()
        }
    }
}
