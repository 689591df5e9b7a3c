//! Signed, time-limited session tokens.
//!
//! Tokens are compact HS256 JWTs: `base64url(header).base64url(claims).base64url(mac)`.
//! Validity is decided by the signature and `exp` alone; nothing is stored
//! server-side.

mod error;

pub use error::{Error, InvalidToken};

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens with a process-wide symmetric key.
#[derive(Clone)]
pub struct TokenService {
    key: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(key: SecretString) -> Self {
        Self {
            key,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` using the configured lifetime.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be encoded or signed.
    pub fn issue_default(&self, subject: &str) -> Result<String, Error> {
        self.issue(subject, self.ttl)
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    ///
    /// # Errors
    /// Returns an error if `ttl` is zero, or the claims cannot be encoded or signed.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, Error> {
        self.issue_at(subject, ttl, now_unix_seconds())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error if `ttl` is zero, or the claims cannot be encoded or signed.
    pub fn issue_at(&self, subject: &str, ttl: Duration, now: i64) -> Result<String, Error> {
        let ttl_seconds = i64::try_from(ttl.as_secs()).map_err(|_| Error::InvalidTtl)?;
        if ttl_seconds <= 0 {
            return Err(Error::InvalidTtl);
        }

        let claims = SessionClaims {
            sub: Some(subject.to_string()),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        };

        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify `token` and return its subject.
    ///
    /// Every failure (malformed, wrong key, tampered, expired, no subject)
    /// is reported as the same [`InvalidToken`].
    ///
    /// # Errors
    /// Returns [`InvalidToken`] if the token is not valid right now.
    pub fn verify(&self, token: &str) -> Result<String, InvalidToken> {
        self.verify_at(token, now_unix_seconds())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] if the token is not valid at `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, InvalidToken> {
        match self.decode(token, now) {
            Ok(claims) => claims.sub.ok_or(InvalidToken),
            Err(err) => {
                debug!("token rejected: {err}");
                Err(InvalidToken)
            }
        }
    }

    fn decode(&self, token: &str, now: i64) -> Result<SessionClaims, Error> {
        let mut parts = token.trim().split('.');
        let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
        if parts.next().is_some() {
            return Err(Error::TokenFormat);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(Error::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
        let mut mac = self.mac()?;
        mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.sub.as_deref().map_or(true, str::is_empty) {
            return Err(Error::MissingSubject);
        }
        if claims.exp < now {
            return Err(Error::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|_| Error::InvalidKey)
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const SUBJECT: &str = "3f2b8c1e-8d1a-4c55-9a0e-6f1f8a3b7c21";

    fn service(key: &str) -> TokenService {
        TokenService::new(SecretString::from(key.to_string()))
    }

    fn tamper_claims(token: &str, claims: &SessionClaims) -> Result<String, Error> {
        let mut parts = token.split('.');
        let header = parts.next().ok_or(Error::TokenFormat)?;
        let _ = parts.next();
        let sig = parts.next().ok_or(Error::TokenFormat)?;
        Ok(format!("{header}.{}.{sig}", b64e_json(claims)?))
    }

    #[test]
    fn issue_then_verify_returns_subject() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let token = tokens.issue_at(SUBJECT, DEFAULT_TOKEN_TTL, NOW)?;
        assert_eq!(tokens.verify_at(&token, NOW), Ok(SUBJECT.to_string()));
        Ok(())
    }

    #[test]
    fn issue_uses_wall_clock() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let token = tokens.issue(SUBJECT, Duration::from_secs(5))?;
        assert_eq!(tokens.verify(&token), Ok(SUBJECT.to_string()));
        Ok(())
    }

    #[test]
    fn token_has_three_segments_and_hs256_header() -> Result<(), Error> {
        let tokens = service("k");
        let token = tokens.issue_at(SUBJECT, DEFAULT_TOKEN_TTL, NOW)?;
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        let header: TokenHeader = b64d_json(segments[0])?;
        assert_eq!(header, TokenHeader::hs256());
        let claims: SessionClaims = b64d_json(segments[1])?;
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        Ok(())
    }

    #[test]
    fn expired_token_is_invalid() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let token = tokens.issue_at(SUBJECT, Duration::from_secs(60), NOW)?;
        assert!(tokens.verify_at(&token, NOW + 60).is_ok());
        assert_eq!(tokens.verify_at(&token, NOW + 61), Err(InvalidToken));
        Ok(())
    }

    #[test]
    fn token_from_other_key_is_invalid() -> Result<(), Error> {
        let issuer = service("key-one");
        let verifier = service("key-two");
        let token = issuer.issue_at(SUBJECT, DEFAULT_TOKEN_TTL, NOW)?;
        assert_eq!(verifier.verify_at(&token, NOW), Err(InvalidToken));
        Ok(())
    }

    #[test]
    fn tampered_payload_is_invalid() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let token = tokens.issue_at(SUBJECT, DEFAULT_TOKEN_TTL, NOW)?;
        let forged = tamper_claims(
            &token,
            &SessionClaims {
                sub: Some("someone-else".to_string()),
                iat: NOW,
                exp: NOW + 60,
            },
        )?;
        assert_eq!(tokens.verify_at(&forged, NOW), Err(InvalidToken));
        Ok(())
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let tokens = service("insecure-demo-secret-key");
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert_eq!(tokens.verify_at(token, NOW), Err(InvalidToken), "{token}");
        }
    }

    #[test]
    fn missing_subject_is_rejected() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let claims = SessionClaims {
            sub: None,
            iat: NOW,
            exp: NOW + 60,
        };
        let signing_input = format!(
            "{}.{}",
            b64e_json(&TokenHeader::hs256())?,
            b64e_json(&claims)?
        );
        let mut mac = tokens.mac()?;
        mac.update(signing_input.as_bytes());
        let sig = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());
        let token = format!("{signing_input}.{sig}");

        assert!(matches!(tokens.decode(&token, NOW), Err(Error::MissingSubject)));
        assert_eq!(tokens.verify_at(&token, NOW), Err(InvalidToken));
        Ok(())
    }

    #[test]
    fn unsupported_algorithm_is_rejected() -> Result<(), Error> {
        let tokens = service("insecure-demo-secret-key");
        let token = tokens.issue_at(SUBJECT, DEFAULT_TOKEN_TTL, NOW)?;
        let rest = token.split_once('.').map(|(_, rest)| rest).ok_or(Error::TokenFormat)?;
        let none_header = b64e_json(&TokenHeader {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })?;
        let forged = format!("{none_header}.{rest}");
        assert!(matches!(
            tokens.decode(&forged, NOW),
            Err(Error::UnsupportedAlg(alg)) if alg == "none"
        ));
        Ok(())
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let tokens = service("k");
        assert!(matches!(
            tokens.issue_at(SUBJECT, Duration::ZERO, NOW),
            Err(Error::InvalidTtl)
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let tokens = service("super-secret");
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
