// ABOUTME: HTTP request handlers for user administration
// ABOUTME: Admin CRUD, activation toggles, password resets, statistics, and the caller's own profile

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use docuapp_storage::StorageError;
use docuapp_users::{UserCreateInput, UserFilter, UserUpdateInput};
use serde::Deserialize;
use tracing::info;

use crate::auth::{AdminUser, CurrentUser};
use crate::db::DbState;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{created_or_error, ok_or_error};

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// The authenticated caller
pub async fn get_current_user(user: CurrentUser) -> impl IntoResponse {
    ok_or_error(Ok::<_, StorageError>(user.0), "Failed to get current user")
}

pub async fn list_users(
    State(db): State<DbState>,
    _admin: AdminUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<UserFilter>,
) -> impl IntoResponse {
    info!("Listing users (page: {})", pagination.page());

    let result = db
        .user_storage
        .list_users_paginated(&filter, Some(pagination.limit()), Some(pagination.offset()))
        .await
        .map(|(users, total)| PaginatedResponse::new(users, &pagination, total));

    ok_or_error(result, "Failed to list users")
}

pub async fn user_stats(State(db): State<DbState>, _admin: AdminUser) -> impl IntoResponse {
    let result = db.user_storage.stats().await;
    ok_or_error(result, "Failed to get user statistics")
}

pub async fn create_user(
    State(db): State<DbState>,
    admin: AdminUser,
    Json(input): Json<UserCreateInput>,
) -> impl IntoResponse {
    info!("Creating user '{}' (by {})", input.username, admin.id());

    let result = db.user_storage.create_user(input).await;
    created_or_error(result, "Failed to create user")
}

pub async fn get_user(
    State(db): State<DbState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let result = db.user_storage.get_user(&id).await;
    ok_or_error(result, "Failed to get user")
}

pub async fn update_user(
    State(db): State<DbState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(input): Json<UserUpdateInput>,
) -> impl IntoResponse {
    info!("Updating user: {}", id);

    let result = db.user_storage.update_user(&id, input).await;
    ok_or_error(result, "Failed to update user")
}

pub async fn delete_user(
    State(db): State<DbState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting user: {} (by {})", id, admin.id());

    let result = db.user_storage.delete_user(&id, admin.id()).await;
    ok_or_error(result, "Failed to delete user")
}

pub async fn toggle_active(
    State(db): State<DbState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Toggling active flag for user: {}", id);

    let result = db.user_storage.toggle_active(&id, admin.id()).await;
    ok_or_error(result, "Failed to toggle user status")
}

pub async fn reset_password(
    State(db): State<DbState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    info!("Resetting password for user: {}", id);

    let result = db
        .user_storage
        .reset_password(&id, &request.password, &request.confirm_password)
        .await;
    ok_or_error(result, "Failed to reset password")
}
