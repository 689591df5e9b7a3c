//! # disaster-auth
//!
//! Signup/login API for the disaster demo app. Users sign up with an email and
//! password, log in through an `OAuth2` password form, and receive a short-lived
//! HS256 bearer token that unlocks their profile.
//!
//! ## Fault Injection
//!
//! Signup and login consult an external flag oracle before touching credentials.
//! When `release-new-auth` or `enable-disaster-mode` is on, the request fails
//! with a synthetic `500` and an `http.500` telemetry event is recorded. On
//! login this happens after the user lookup and before password verification,
//! so valid credentials fail too.
//!
//! ## Tokens
//!
//! Tokens are self-contained JWTs carrying `sub`, `iat` and `exp`. There is no
//! server-side session store, so a token stays valid until it expires.
//! Verification failures are deliberately indistinguishable to callers.

pub mod api;
pub mod cli;
pub mod flags;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
