//! Boolean flag decision services.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};
use tracing::{error, instrument};

use super::context::{AuthDecisionContext, ContextPayload};

const ORACLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Opaque boolean decision per flag and context.
///
/// Implementations must answer `false` when they cannot decide.
#[async_trait]
pub trait FlagOracle: Send + Sync {
    async fn evaluate(&self, flag: &str, context: &AuthDecisionContext) -> bool;
}

/// Fixed decisions, independent of the context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticFlags {
    flags: HashMap<String, bool>,
}

impl StaticFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, flag: impl Into<String>, value: bool) -> Self {
        self.flags.insert(flag.into(), value);
        self
    }

    /// Parse `name=bool` entries; a bare `name` means `true`.
    ///
    /// # Errors
    /// Returns an error on an empty name or a value that is not a boolean.
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let (name, value) = match entry.split_once('=') {
                Some((name, value)) => (name.trim(), parse_bool(value.trim())?),
                None => (entry, true),
            };
            if name.is_empty() {
                return Err(anyhow!("flag name missing in '{entry}'"));
            }
            flags.flags.insert(name.to_string(), value);
        }
        Ok(flags)
    }

    #[must_use]
    pub fn get(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(anyhow!("invalid flag value '{value}', expected true or false")),
    }
}

#[async_trait]
impl FlagOracle for StaticFlags {
    async fn evaluate(&self, flag: &str, _context: &AuthDecisionContext) -> bool {
        self.get(flag)
    }
}

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    flag: &'a str,
    context: ContextPayload<'a>,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    value: bool,
}

/// Remote decision service reached over HTTP.
///
/// `POST {base_url}/evaluate` with `{flag, context}`, answered by `{"value": bool}`.
#[derive(Clone, Debug)]
pub struct HttpFlagOracle {
    client: Client,
    evaluate_url: String,
}

impl HttpFlagOracle {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(ORACLE_TIMEOUT)
            .build()
            .context("Error creating reqwest client")?;
        Ok(Self {
            client,
            evaluate_url: format!("{}/evaluate", base_url.trim_end_matches('/')),
        })
    }

    async fn fetch(&self, flag: &str, context: &AuthDecisionContext) -> Result<bool> {
        let response = self
            .client
            .post(&self.evaluate_url)
            .json(&EvaluateRequest {
                flag,
                context: ContextPayload::from(context),
            })
            .send()
            .await?
            .error_for_status()?;
        let decision: EvaluateResponse = response.json().await?;
        Ok(decision.value)
    }
}

#[async_trait]
impl FlagOracle for HttpFlagOracle {
    #[instrument(skip(self, context), fields(context.key = %context.key()))]
    async fn evaluate(&self, flag: &str, context: &AuthDecisionContext) -> bool {
        match self.fetch(flag, context).await {
            Ok(value) => value,
            Err(e) => {
                error!("Error evaluating flag {flag}: {e:?}");
                false
            }
        }
    }
}
