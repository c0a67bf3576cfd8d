use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::{AuthError, AuthProvider, AuthSession, ProviderSession, ProviderUser};
use crate::config::ProviderConfig;

const USER_AGENT: &str = concat!("auth-relay/", env!("CARGO_PKG_VERSION"));

/// GoTrue REST client (the auth API behind Supabase)
#[derive(Clone)]
pub struct GoTrueProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Shape of `/token` responses; signup returns it too when autoconfirm is on
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Option<ProviderUser>,
}

impl TokenResponse {
    fn session(&self) -> Option<ProviderSession> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(ProviderSession {
                    access_token: access.clone(),
                    refresh_token: refresh.clone(),
                    token_type: self.token_type.clone(),
                    expires_in: self.expires_in,
                    expires_at: self.expires_at,
                })
            }
            _ => None,
        }
    }
}

impl GoTrueProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("unsupported provider scheme {}", url.scheme()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Value, AuthError> {
        let response = request
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!("auth provider {} request failed: {}", operation, e);
                AuthError::unreachable()
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("auth provider {} response unreadable: {}", operation, e);
            AuthError::unreachable()
        })?;

        if !status.is_success() {
            let err = error_from_body(status, &body);
            debug!("auth provider {} rejected with {}: {}", operation, err.status, err.message);
            return Err(err);
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("auth provider {} returned invalid JSON: {}", operation, e);
            AuthError::new(502, "Invalid response from authentication provider")
        })
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<TokenResponse, AuthError> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);

        let value = self.send("token", request).await?;
        decode(value)
    }
}

#[async_trait]
impl AuthProvider for GoTrueProvider {
    async fn signup(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let request = self
            .client
            .post(self.endpoint("signup"))
            .json(&json!({ "email": email, "password": password }));

        let value = self.send("signup", request).await?;

        // With email confirmation enabled the provider answers with the bare user
        if value.get("access_token").is_none() {
            let user = value.get("user").cloned().unwrap_or(value);
            if user.get("id").is_none() {
                return Err(AuthError::new(
                    500,
                    "No user object returned. Something went wrong during registration.",
                ));
            }
            return Ok(AuthSession {
                user: decode(user)?,
                session: None,
            });
        }

        let token: TokenResponse = decode(value)?;
        let session = token.session();
        let user = token.user.ok_or_else(|| {
            AuthError::new(500, "No user object returned. Something went wrong during registration.")
        })?;

        Ok(AuthSession { user, session })
    }

    async fn signin(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let token = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;

        let session = token.session().ok_or_else(AuthError::token_generation_failed)?;
        let user = token.user.ok_or_else(AuthError::token_generation_failed)?;

        Ok(AuthSession {
            user,
            session: Some(session),
        })
    }

    async fn signout(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self
            .client
            .post(self.endpoint("logout"))
            .bearer_auth(access_token);

        self.send("logout", request).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        let token = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;

        token.session().ok_or_else(AuthError::token_generation_failed)
    }

    async fn user_by_access_token(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let request = self.client.get(self.endpoint("user")).bearer_auth(access_token);

        let value = self.send("user", request).await?;
        decode(value)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, AuthError> {
    serde_json::from_value(value).map_err(|e| {
        warn!("auth provider payload did not match expected shape: {}", e);
        AuthError::new(502, "Invalid response from authentication provider")
    })
}

/// Build an AuthError from a non-2xx provider response.
/// GoTrue has used `msg`, `message`, `error_description` and `error` over time.
fn error_from_body(status: StatusCode, body: &[u8]) -> AuthError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let message = ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Authentication failed")
                .to_string()
        });

    let code = ["error_code", "code"]
        .iter()
        .find_map(|key| parsed.get(*key))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    AuthError {
        status: status.as_u16(),
        message,
        code,
    }
}
