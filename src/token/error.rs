use thiserror::Error;

/// Detailed decode failures. These stay inside the crate; callers of
/// [`super::TokenService::verify`] only ever see [`InvalidToken`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("missing subject")]
    MissingSubject,
    #[error("token expired")]
    Expired,
    #[error("invalid token ttl")]
    InvalidTtl,
}

/// The only failure a token verification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid token")]
pub struct InvalidToken;
