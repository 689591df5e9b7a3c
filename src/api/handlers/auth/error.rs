//! Request-boundary errors for auth endpoints.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::{flags::InjectedFailure, store};

pub const BAD_CREDENTIALS: &str = "Incorrect email or password";
pub const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";
pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    Conflict,
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("User not found")]
    NotFound,
    #[error("{}", SERVICE_UNAVAILABLE)]
    InjectedFailure,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// JSON error body.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

impl AuthError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Conflict | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InjectedFailure | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InjectedFailure> for AuthError {
    fn from(_: InjectedFailure) -> Self {
        Self::InjectedFailure
    }
}

impl From<store::Error> for AuthError {
    fn from(err: store::Error) -> Self {
        match err {
            store::Error::Conflict => Self::Conflict,
            store::Error::Hash(err) => Self::Internal(err),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(err) = &self {
            error!("Internal error: {err:?}");
        }

        let body = Json(ErrorBody {
            detail: self.to_string(),
        });

        match self {
            Self::Unauthorized(_) => (
                status,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
