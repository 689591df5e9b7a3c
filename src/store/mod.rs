//! In-memory credential store.
//!
//! Flow Overview: records are keyed by id and owned by a single `UserStore`
//! constructed at startup. Email lookups are linear. `create` re-checks the
//! email under the write lock, so concurrent signups for one address cannot
//! both succeed.

pub mod password;

pub use password::{Argon2Scheme, HashCost, PasswordScheme};

use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("email already registered")]
    Conflict,
    #[error("password hashing failed: {0}")]
    Hash(#[source] anyhow::Error),
}

/// A stored user. The password hash never leaves this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    password_hash: String,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub website: Option<String>,
}

impl UserRecord {
    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("website", &self.website)
            .finish()
    }
}

/// Allow-listed profile fields. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub website: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.username.is_none() && self.website.is_none()
    }
}

pub struct UserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    scheme: Arc<dyn PasswordScheme>,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").finish_non_exhaustive()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new(Arc::new(Argon2Scheme::default()))
    }
}

impl UserStore {
    #[must_use]
    pub fn new(scheme: Arc<dyn PasswordScheme>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            scheme,
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let users = self.users.read().await;
        users.values().find(|user| user.email == email).cloned()
    }

    pub async fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Create a user with a freshly hashed password and a new id.
    ///
    /// # Errors
    /// Returns [`Error::Conflict`] if the email is taken and [`Error::Hash`]
    /// if the password cannot be hashed.
    #[instrument(skip(self, password))]
    pub async fn create(&self, email: &str, password: &str) -> Result<UserRecord, Error> {
        // Hash before taking the lock; it is the slow part.
        let password_hash = self.hash_password(password).await?;

        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(Error::Conflict);
        }

        let mut id = Uuid::new_v4();
        while users.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let record = UserRecord {
            id,
            email: email.to_string(),
            password_hash,
            full_name: None,
            username: None,
            website: None,
        };
        users.insert(id, record.clone());
        debug!(user_id = %id, "user created");

        Ok(record)
    }

    /// Check `plain` against `hash` on the blocking pool.
    pub async fn verify_password(&self, plain: &str, hash: &str) -> bool {
        let scheme = Arc::clone(&self.scheme);
        let plain = plain.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || scheme.verify(&plain, &hash))
            .await
            .unwrap_or(false)
    }

    /// Apply allow-listed profile fields to the user with `id`.
    ///
    /// Returns `None` if no such user exists.
    pub async fn update(&self, id: Uuid, update: ProfileUpdate) -> Option<UserRecord> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&id)?;

        if let Some(full_name) = update.full_name {
            record.full_name = Some(full_name);
        }
        if let Some(username) = update.username {
            record.username = Some(username);
        }
        if let Some(website) = update.website {
            record.website = Some(website);
        }

        Some(record.clone())
    }

    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let scheme = Arc::clone(&self.scheme);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || scheme.hash(&password))
            .await
            .map_err(|err| Error::Hash(anyhow::anyhow!("hashing task failed: {err}")))?
            .map_err(Error::Hash)
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_support::CountingScheme;
    use super::*;

    fn store() -> (UserStore, Arc<CountingScheme>) {
        let scheme = Arc::new(CountingScheme::default());
        (UserStore::new(scheme.clone()), scheme)
    }

    #[tokio::test]
    async fn create_assigns_id_and_leaves_profile_unset() {
        let (store, _) = store();
        let user = store.create("alice@x.com", "pw123").await.unwrap();
        assert_eq!(user.email, "alice@x.com");
        assert_eq!(user.full_name, None);
        assert_eq!(user.username, None);
        assert_eq!(user.website, None);
        assert_ne!(user.password_hash(), "pw123");
        assert_eq!(store.get(user.id).await, Some(user));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let (store, _) = store();
        store.create("alice@x.com", "pw123").await.unwrap();
        let err = store.create("alice@x.com", "other").await.err();
        assert!(matches!(err, Some(Error::Conflict)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_signups_insert_once() {
        let (store, _) = store();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create("race@x.com", "pw").await.is_ok()
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_by_email_is_exact() {
        let (store, _) = store();
        assert!(store.is_empty().await);
        let user = store.create("alice@x.com", "pw123").await.unwrap();
        assert_eq!(store.find_by_email("alice@x.com").await, Some(user));
        assert_eq!(store.find_by_email("bob@x.com").await, None);
    }

    #[tokio::test]
    async fn verify_password_uses_scheme() {
        let (store, scheme) = store();
        let user = store.create("alice@x.com", "pw123").await.unwrap();
        assert!(store.verify_password("pw123", user.password_hash()).await);
        assert!(!store.verify_password("nope", user.password_hash()).await);
        assert_eq!(scheme.verifications(), 2);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let (store, _) = store();
        let user = store.create("alice@x.com", "pw123").await.unwrap();

        let updated = store
            .update(
                user.id,
                ProfileUpdate {
                    full_name: Some("X".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("X"));
        assert_eq!(updated.username, None);
        assert_eq!(updated.website, None);
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.password_hash(), user.password_hash());
        assert_eq!(updated.id, user.id);

        let again = store
            .update(
                user.id,
                ProfileUpdate {
                    website: Some("https://alice.dev".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(again.full_name.as_deref(), Some("X"));
        assert_eq!(again.website.as_deref(), Some("https://alice.dev"));
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let (store, _) = store();
        assert!(store.update(Uuid::new_v4(), ProfileUpdate::default()).await.is_none());
    }

    #[tokio::test]
    async fn argon2_store_round_trip() {
        let scheme = Argon2Scheme::new(HashCost {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let store = UserStore::new(Arc::new(scheme));
        let user = store.create("alice@x.com", "pw123").await.unwrap();
        assert!(user.password_hash().starts_with("$argon2id$"));
        assert!(store.verify_password("pw123", user.password_hash()).await);
    }

    #[test]
    fn debug_redacts_password_hash() {
        let record = UserRecord {
            id: Uuid::nil(),
            email: "alice@x.com".to_string(),
            password_hash: "secret-hash".to_string(),
            full_name: None,
            username: None,
            website: None,
        };
        assert!(!format!("{record:?}").contains("secret-hash"));
    }
}
