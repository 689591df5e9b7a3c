//! `POST /api/signup`.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    error::{AuthError, ErrorBody},
    flow,
    state::AuthState,
    types::{SignupRequest, UserProfile},
};

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User registered", body = UserProfile),
        (status = 400, description = "Email already registered or invalid input", body = ErrorBody),
        (status = 500, description = "Service temporarily unavailable", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn signup(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return AuthError::InvalidInput("Missing payload".to_string()).into_response();
    };

    let email = request.email.trim();

    match flow::signup(&auth_state, email, &request.password).await {
        Ok(user) => (StatusCode::OK, Json(UserProfile::from(&user))).into_response(),
        Err(err) => err.into_response(),
    }
}
