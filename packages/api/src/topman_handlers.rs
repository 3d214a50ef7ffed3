// ABOUTME: HTTP request handlers for top-management reporting
// ABOUTME: Weekly reports, the tagging screen, tag toggling, and the weekly summary (admins only)

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use docuapp_topman::{ReportInput, TagRequest};
use serde::Deserialize;
use tracing::info;

use crate::auth::AdminUser;
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{created_or_error, ok_or_error};

/// Optional week selection; both bounds are needed to override the current week
#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub week_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub week_end: Option<NaiveDate>,
}

pub async fn list_reports(
    State(db): State<DbState>,
    _admin: AdminUser,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    info!("Listing top-management reports (page: {})", pagination.page());

    let result = db
        .topman_storage
        .list_reports_paginated(Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(reports, total)| PaginatedResponse::new(reports, &pagination, total));

    ok_or_error(result, "Failed to list reports")
}

pub async fn create_report(
    State(db): State<DbState>,
    admin: AdminUser,
    Json(input): Json<ReportInput>,
) -> impl IntoResponse {
    info!(
        "Creating top-management report for {} to {}",
        input.week_start, input.week_end
    );

    let result = db.topman_storage.create_report(admin.id(), input).await;
    created_or_error(result, "Failed to create report")
}

pub async fn get_report(
    State(db): State<DbState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Getting top-management report: {}", id);

    let result = db.topman_storage.report_detail(&id).await;
    ok_or_error(result, "Failed to get report")
}

pub async fn update_report(
    State(db): State<DbState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(input): Json<ReportInput>,
) -> impl IntoResponse {
    info!("Updating top-management report: {}", id);

    let result = db.topman_storage.update_report(&id, input).await;
    ok_or_error(result, "Failed to update report")
}

pub async fn delete_report(
    State(db): State<DbState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting top-management report: {} (by {})", id, admin.id());

    let result = db
        .topman_storage
        .delete_report(&id, admin.0.is_superuser)
        .await;
    ok_or_error(result, "Failed to delete report")
}

/// Journals of the week plus the report they can be tagged into; creates the report on first visit
pub async fn tagging_interface(
    State(db): State<DbState>,
    admin: AdminUser,
    Query(week): Query<WeekQuery>,
) -> impl IntoResponse {
    info!("Opening tagging interface for {}", admin.id());

    let result = db
        .topman_storage
        .tagging_interface(week.week_start, week.week_end, admin.id())
        .await;
    ok_or_error(result, "Failed to load tagging interface")
}

pub async fn tag_item(
    State(db): State<DbState>,
    admin: AdminUser,
    Json(request): Json<TagRequest>,
) -> impl IntoResponse {
    info!(
        "Tag request {:?} for journal {} ({:?} #{})",
        request.action, request.journal_id, request.section, request.item_index
    );

    let result = db
        .topman_storage
        .apply_tag_request(request, admin.id())
        .await;
    ok_or_error(result, "Failed to update tag")
}

pub async fn weekly_summary(
    State(db): State<DbState>,
    _admin: AdminUser,
    Query(week): Query<WeekQuery>,
) -> impl IntoResponse {
    let result = db
        .topman_storage
        .weekly_summary(week.week_start, week.week_end)
        .await;
    ok_or_error(result, "Failed to build weekly summary")
}
