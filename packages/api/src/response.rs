// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use docuapp_storage::StorageError;
use serde::Serialize;
use tracing::error;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error envelope with the given status
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, ResponseJson(ApiResponse::<()>::error(message.into()))).into_response()
}

/// A storage error on its way to the client
#[derive(Debug)]
pub struct ApiError(pub StorageError);

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and client-safe message; database details never leave the server
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            StorageError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            StorageError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
            StorageError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            StorageError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            StorageError::Database(_) | StorageError::Sqlx(_) | StorageError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            StorageError::Export(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Export failed".to_string(),
            ),
            StorageError::Io(_) | StorageError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        error_response(status, message)
    }
}

fn respond<T: Serialize>(
    result: Result<T, StorageError>,
    success_status: StatusCode,
    context: &str,
) -> Response {
    match result {
        Ok(data) => (success_status, ResponseJson(ApiResponse::success(data))).into_response(),
        Err(err) => {
            let api_error = ApiError(err);
            let (status, _) = api_error.status_and_message();
            if status.is_server_error() {
                error!("{}: {}", context, api_error.0);
            }
            api_error.into_response()
        }
    }
}

/// 200 with the data, or the mapped error
pub fn ok_or_error<T: Serialize>(result: Result<T, StorageError>, context: &str) -> Response {
    respond(result, StatusCode::OK, context)
}

/// 201 with the data, or the mapped error
pub fn created_or_error<T: Serialize>(result: Result<T, StorageError>, context: &str) -> Response {
    respond(result, StatusCode::CREATED, context)
}
