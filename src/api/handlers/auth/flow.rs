//! Signup and login sequencing.
//!
//! Login: lookup → fault check (user context) → password check → token.
//! Signup: existence check → fault check (anonymous) → create.
//! The fault check always runs before any password work.

use tracing::{debug, info, instrument};

use super::{
    error::{AuthError, BAD_CREDENTIALS},
    state::AuthState,
};
use crate::{flags::AuthDecisionContext, store::UserRecord};

/// Register a new user.
///
/// # Errors
/// Returns `Conflict` if the email is taken, `InjectedFailure` when a fault
/// flag is on, or `Internal` if hashing fails. Email and password are stored
/// as given.
#[instrument(skip(auth_state, password))]
pub async fn signup(
    auth_state: &AuthState,
    email: &str,
    password: &str,
) -> Result<UserRecord, AuthError> {
    if auth_state.store().find_by_email(email).await.is_some() {
        return Err(AuthError::Conflict);
    }

    auth_state
        .faults()
        .maybe_fail(&AuthDecisionContext::Anonymous)
        .await?;

    // The store re-checks the email atomically; a concurrent signup loses here.
    let user = auth_state.store().create(email, password).await?;
    info!(user_id = %user.id, "signup completed");

    Ok(user)
}

/// Exchange credentials for an access token.
///
/// # Errors
/// Returns `Unauthorized` for an unknown email or a wrong password,
/// `InjectedFailure` when a fault flag is on, or `Internal` if signing fails.
#[instrument(skip(auth_state, password))]
pub async fn login(
    auth_state: &AuthState,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    let Some(user) = auth_state.store().find_by_email(email).await else {
        debug!("login rejected: no such user");
        return Err(AuthError::Unauthorized(BAD_CREDENTIALS));
    };

    let context = AuthDecisionContext::user(user.id, user.email.clone());
    auth_state.faults().maybe_fail(&context).await?;

    if !auth_state
        .store()
        .verify_password(password, user.password_hash())
        .await
    {
        debug!(user_id = %user.id, "login rejected: bad credentials");
        return Err(AuthError::Unauthorized(BAD_CREDENTIALS));
    }

    let token = auth_state
        .tokens()
        .issue_default(&user.id.to_string())
        .map_err(|err| AuthError::Internal(err.into()))?;
    info!(user_id = %user.id, "token issued");

    Ok(token)
}
