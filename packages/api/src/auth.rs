// ABOUTME: Authentication context for API requests
// ABOUTME: Resolves the calling user from the X-User-Id header and enforces admin access

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use docuapp_storage::StorageError;
use docuapp_users::User;
use tracing::{debug, error, warn};

use crate::db::DbState;
use crate::response::{error_response, ApiError};

/// Header carrying the id of the calling user
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated, active caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl FromRequestParts<DbState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &DbState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!(path = %parts.uri.path(), "Missing user header");
                error_response(
                    StatusCode::UNAUTHORIZED,
                    "Authentication required. Please include the X-User-Id header.",
                )
            })?;

        let user = match state.user_storage.get_user(user_id).await {
            Ok(user) => user,
            Err(StorageError::NotFound(_)) => {
                warn!(user_id = %user_id, "Unknown user");
                return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid user"));
            }
            Err(e) => {
                error!("Failed to load user {}: {}", user_id, e);
                return Err(ApiError(e).into_response());
            }
        };

        if !user.is_active {
            warn!(user_id = %user_id, "Inactive user rejected");
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "This account has been deactivated.",
            ));
        }

        debug!(user_id = %user_id, "Request authenticated");
        Ok(Self(user))
    }
}

/// A caller with staff or superuser rights
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl AdminUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl FromRequestParts<DbState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &DbState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            warn!(user_id = %user.id, path = %parts.uri.path(), "Admin access denied");
            return Err(error_response(StatusCode::FORBIDDEN, "Admin access required."));
        }

        Ok(Self(user))
    }
}
