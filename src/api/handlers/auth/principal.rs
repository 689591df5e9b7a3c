//! Authenticated principal extraction.
//!
//! Flow Overview: read the bearer token from `Authorization`, verify it with
//! the token service, and hand the subject to downstream handlers. Every
//! failure becomes the same 401 with a `Bearer` challenge.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use uuid::Uuid;

use super::{
    error::{AuthError, INVALID_CREDENTIALS},
    state::AuthState,
};

/// Authenticated user context derived from the bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Resolve the bearer token into a principal, or fail with 401.
///
/// # Errors
/// Returns [`AuthError::Unauthorized`] when the header is missing, is not a
/// bearer credential, or carries an invalid token.
pub fn require_auth(headers: &HeaderMap, auth_state: &AuthState) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::Unauthorized(INVALID_CREDENTIALS))?;

    let subject = auth_state
        .tokens()
        .verify(&token)
        .map_err(|_| AuthError::Unauthorized(INVALID_CREDENTIALS))?;

    // Subjects are only ever minted from store ids.
    let user_id =
        Uuid::parse_str(&subject).map_err(|_| AuthError::Unauthorized(INVALID_CREDENTIALS))?;

    Ok(Principal { user_id })
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
