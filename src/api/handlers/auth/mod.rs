//! Auth handlers and supporting modules.
//!
//! Signup and login go through [`flow`], which orders the existence check,
//! the fault injector and password verification. Protected routes call
//! [`principal::require_auth`] to turn a bearer token into a user id.

pub(crate) mod error;
pub(crate) mod flow;
pub(crate) mod principal;
pub(crate) mod signup;
mod state;
pub(crate) mod token;
pub(crate) mod types;

pub use error::{AuthError, ErrorBody};
pub use state::{AuthConfig, AuthState};
