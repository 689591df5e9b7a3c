//! Command-line argument dispatch.
//!
//! Validated CLI matches become an [`Action`] carrying everything the server
//! needs, so nothing past this point reads clap state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, auth, flags};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8000);

    let auth_opts = auth::Options::parse(matches)?;
    let flag_source = flags::Source::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        hash_cost: auth_opts.hash_cost,
        frontend_origin: auth_opts.frontend_origin,
        flag_source,
    }))
}
