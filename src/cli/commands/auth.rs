use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::store::HashCost;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_HASH_MEMORY_KIB: &str = "hash-memory-kib";
pub const ARG_HASH_ITERATIONS: &str = "hash-iterations";
pub const ARG_HASH_PARALLELISM: &str = "hash-parallelism";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    let command = with_hash_args(command);
    command.arg(
        Arg::new(ARG_FRONTEND_ORIGIN)
            .long(ARG_FRONTEND_ORIGIN)
            .help("Frontend origin allowed by CORS")
            .env("DISASTER_AUTH_FRONTEND_ORIGIN")
            .default_value("http://localhost:5173"),
    )
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Symmetric key used to sign access tokens (HS256)")
                .env("DISASTER_AUTH_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Access token lifetime in seconds")
                .env("DISASTER_AUTH_TOKEN_TTL_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn with_hash_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_HASH_MEMORY_KIB)
                .long(ARG_HASH_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("DISASTER_AUTH_HASH_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_ITERATIONS)
                .long(ARG_HASH_ITERATIONS)
                .help("Argon2id iteration count")
                .env("DISASTER_AUTH_HASH_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_HASH_PARALLELISM)
                .long(ARG_HASH_PARALLELISM)
                .help("Argon2id lanes")
                .env("DISASTER_AUTH_HASH_PARALLELISM")
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub hash_cost: HashCost,
    pub frontend_origin: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the secret is empty or the token TTL is zero or
    /// larger than `i64::MAX` seconds.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .context("missing required argument: --jwt-secret")?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("--jwt-secret must not be empty"));
        }

        let token_ttl_seconds = matches
            .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(1800);
        if token_ttl_seconds == 0 {
            return Err(anyhow!("--token-ttl-seconds must be positive"));
        }
        // Token claims are signed 64-bit timestamps.
        if i64::try_from(token_ttl_seconds).is_err() {
            return Err(anyhow!(
                "--token-ttl-seconds must not exceed {} seconds",
                i64::MAX
            ));
        }

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: matches
                .get_one::<u32>(ARG_HASH_MEMORY_KIB)
                .copied()
                .unwrap_or(defaults.memory_kib),
            iterations: matches
                .get_one::<u32>(ARG_HASH_ITERATIONS)
                .copied()
                .unwrap_or(defaults.iterations),
            parallelism: matches
                .get_one::<u32>(ARG_HASH_PARALLELISM)
                .copied()
                .unwrap_or(defaults.parallelism),
        };

        let frontend_origin = matches
            .get_one::<String>(ARG_FRONTEND_ORIGIN)
            .cloned()
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret.clone()),
            token_ttl_seconds,
            hash_cost,
            frontend_origin,
        })
    }
}
