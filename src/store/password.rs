//! Password hashing schemes.

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;

/// A salted, slow, one-way password hash.
pub trait PasswordScheme: Send + Sync {
    /// Hash `plain` into a self-describing string.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    fn hash(&self, plain: &str) -> Result<String>;

    /// Check `plain` against a hash produced by [`PasswordScheme::hash`].
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id with PHC-formatted output.
#[derive(Clone, Debug)]
pub struct Argon2Scheme {
    params: Params,
}

impl Argon2Scheme {
    /// # Errors
    /// Returns an error if the cost parameters are out of range for Argon2.
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| anyhow!("invalid Argon2 parameters: {err}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Scheme {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|_| anyhow!("failed to hash password"))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        // Parameters embedded in the PHC string take precedence over ours.
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}
