// Credential gateway: everything credential-related is delegated to the
// managed auth provider. Implementations are stateless between calls and make
// exactly one round trip per operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod gotrue;
mod messages;

pub use gotrue::GoTrueProvider;

/// Failure reported by the provider, or by the gateway while talking to it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub status: u16,
    pub message: String,
    pub code: Option<String>,
}

impl AuthError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn unreachable() -> Self {
        Self::new(503, "Authentication provider unreachable")
    }

    pub fn token_generation_failed() -> Self {
        Self::new(500, "Token generation failed")
    }

    /// Provider refused the request (bad credentials, expired token, ...)
    pub fn is_rejection(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Message safe to show end users; unknown provider messages pass through
    pub fn friendly_message(&self) -> String {
        messages::friendly(&self.message)
    }
}

/// User record owned by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl ProviderUser {
    pub fn is_verified(&self) -> bool {
        self.user_metadata
            .get("isUserVerified")
            .and_then(Value::as_bool)
            .unwrap_or(self.email_confirmed_at.is_some())
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Opaque bearer pair issued by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: ProviderUser,
    /// Absent when the provider holds the account for email confirmation
    pub session: Option<ProviderSession>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn signin(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn signout(&self, access_token: &str) -> Result<(), AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, AuthError>;

    async fn user_by_access_token(&self, access_token: &str) -> Result<ProviderUser, AuthError>;
}
