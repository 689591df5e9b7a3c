use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
    },
    cli::commands::flags::Source,
    flags::{FaultInjector, FlagOracle, HttpFlagOracle, LogTelemetry},
    store::HashCost,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub hash_cost: HashCost,
    pub frontend_origin: String,
    pub flag_source: Source,
}

/// Build the flag oracle for the configured source.
///
/// # Errors
/// Returns an error if the HTTP client for a remote oracle cannot be built.
pub fn flag_oracle(source: Source) -> Result<Arc<dyn FlagOracle>> {
    Ok(match source {
        Source::Static(flags) => {
            debug!(?flags, "using static flag decisions");
            Arc::new(flags)
        }
        Source::Remote(url) => {
            info!(url = %url, "using remote flag oracle");
            Arc::new(HttpFlagOracle::new(&url)?)
        }
    })
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth state cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let faults = FaultInjector::new(flag_oracle(args.flag_source)?, Arc::new(LogTelemetry));

    let auth_config = AuthConfig::new(args.jwt_secret)
        .with_token_ttl_seconds(args.token_ttl_seconds)
        .with_hash_cost(args.hash_cost);
    let auth_state =
        Arc::new(AuthState::new(&auth_config, faults).context("Invalid password hash cost")?);

    api::new(args.port, auth_state, &args.frontend_origin).await
}
