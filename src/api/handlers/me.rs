//! Authenticated self-service endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via bearer token.
//! 2) Resolve the current user from the store.
//! 3) Apply allow-listed profile updates.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::store::ProfileUpdate;

use super::auth::{
    AuthState, ErrorBody,
    error::AuthError,
    principal::require_auth,
    types::{ProfileUpdateRequest, UserProfile},
};

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Return the authenticated user profile.", body = UserProfile),
        (status = 401, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 404, description = "User not found.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "me"
)]
pub async fn get_me(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    match auth_state.store().get(principal.user_id).await {
        Some(user) => (StatusCode::OK, Json(UserProfile::from(&user))).into_response(),
        None => AuthError::NotFound.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/me",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated.", body = UserProfile),
        (status = 400, description = "Malformed JSON body.", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token.", body = ErrorBody),
        (status = 404, description = "User not found.", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "me"
)]
pub async fn patch_me(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Response {
    // Authentication decides first; body errors only matter for a known caller.
    let principal = match require_auth(&headers, &auth_state) {
        Ok(principal) => principal,
        Err(err) => return err.into_response(),
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => ProfileUpdateRequest::default(),
        Err(rejection) => {
            debug!(user_id = %principal.user_id, "rejected profile update body");
            return AuthError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    let update: ProfileUpdate = request.into();
    if update.is_empty() {
        debug!(user_id = %principal.user_id, "empty profile update");
    }

    match auth_state.store().update(principal.user_id, update).await {
        Some(user) => {
            debug!(user_id = %user.id, "profile updated");
            (StatusCode::OK, Json(UserProfile::from(&user))).into_response()
        }
        None => AuthError::NotFound.into_response(),
    }
}
