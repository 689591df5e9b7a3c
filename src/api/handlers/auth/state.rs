//! Auth state and configuration.

use anyhow::Result;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

use crate::{
    flags::FaultInjector,
    store::{Argon2Scheme, HashCost, UserStore},
    token::{DEFAULT_TOKEN_TTL, TokenService},
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    token_ttl_seconds: u64,
    hash_cost: HashCost,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL.as_secs(),
            hash_cost: HashCost::default(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn hash_cost(&self) -> HashCost {
        self.hash_cost
    }
}

/// Everything auth handlers need, shared behind an `Arc`.
#[derive(Debug)]
pub struct AuthState {
    store: Arc<UserStore>,
    tokens: TokenService,
    faults: FaultInjector,
}

impl AuthState {
    /// Build the store and token service from `config`.
    ///
    /// # Errors
    /// Returns an error if the hash cost is invalid.
    pub fn new(config: &AuthConfig, faults: FaultInjector) -> Result<Self> {
        let scheme = Argon2Scheme::new(config.hash_cost())?;
        let store = Arc::new(UserStore::new(Arc::new(scheme)));
        let tokens = TokenService::new(config.jwt_secret.clone())
            .with_ttl(Duration::from_secs(config.token_ttl_seconds()));
        Ok(Self::from_parts(store, tokens, faults))
    }

    #[must_use]
    pub fn from_parts(store: Arc<UserStore>, tokens: TokenService, faults: FaultInjector) -> Self {
        Self {
            store,
            tokens,
            faults,
        }
    }

    #[must_use]
    pub fn store(&self) -> &UserStore {
        &self.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }
}
