use serde::Serialize;
use uuid::Uuid;

pub const ANONYMOUS_KEY: &str = "anonymous-user";
pub const CONTEXT_KIND: &str = "user";

/// Who a flag decision is made for. Built per request and never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthDecisionContext {
    Anonymous,
    User { key: Uuid, email: String },
}

impl AuthDecisionContext {
    #[must_use]
    pub fn user(key: Uuid, email: impl Into<String>) -> Self {
        Self::User {
            key,
            email: email.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Anonymous => ANONYMOUS_KEY.to_string(),
            Self::User { key, .. } => key.to_string(),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User { email, .. } => Some(email),
        }
    }
}

/// Wire shape sent to remote decision services.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ContextPayload<'a> {
    pub kind: &'static str,
    pub key: String,
    pub anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

impl<'a> From<&'a AuthDecisionContext> for ContextPayload<'a> {
    fn from(context: &'a AuthDecisionContext) -> Self {
        Self {
            kind: CONTEXT_KIND,
            key: context.key(),
            anonymous: context.is_anonymous(),
            email: context.email(),
        }
    }
}
