//! `POST /api/token`, the `OAuth2` password grant.

use axum::{
    Form, Json,
    extract::{Extension, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{
    error::{AuthError, ErrorBody},
    flow,
    state::AuthState,
    types::{TokenRequest, TokenResponse},
};

#[utoipa::path(
    post,
    path = "/api/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Malformed form", body = ErrorBody),
        (status = 401, description = "Incorrect email or password", body = ErrorBody),
        (status = 500, description = "Service temporarily unavailable", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn token(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let request = match payload {
        Ok(Form(request)) => request,
        Err(rejection) => {
            debug!("token form rejected: {rejection}");
            return AuthError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    // grant_type, scope and client credentials are accepted but not used.
    match flow::login(&auth_state, request.username.trim(), &request.password).await {
        Ok(access_token) => {
            (StatusCode::OK, Json(TokenResponse::bearer(access_token))).into_response()
        }
        Err(err) => err.into_response(),
    }
}
