#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth_relay::config::Environment;
use auth_relay::database::{LocalProfile, NewProfile, ProfileStore, StorageError};
use auth_relay::provider::{AuthError, AuthProvider, AuthSession, ProviderSession, ProviderUser};
use auth_relay::{app, AppState};

pub const PASSWORD: &str = "Str0ng!pwd";

#[derive(Default)]
struct ProviderData {
    // email -> (password, user)
    users: HashMap<String, (String, ProviderUser)>,
    // token -> email
    access_tokens: HashMap<String, String>,
    refresh_tokens: HashMap<String, String>,
}

/// In-memory stand-in for the managed auth provider
#[derive(Default)]
pub struct FakeProvider {
    data: Mutex<ProviderData>,
    issued: AtomicUsize,
    pub signout_calls: AtomicUsize,
    pub signup_calls: AtomicUsize,
    pub fail_signout: AtomicBool,
}

impl FakeProvider {
    pub fn add_user(&self, email: &str, password: &str) -> ProviderUser {
        let user = ProviderUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
            updated_at: Some(Utc::now()),
            email_confirmed_at: Some(Utc::now()),
            user_metadata: json!({}),
        };
        self.data
            .lock()
            .unwrap()
            .users
            .insert(email.to_string(), (password.to_string(), user.clone()));
        user
    }

    fn issue(&self, data: &mut ProviderData, email: &str) -> ProviderSession {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let session = ProviderSession {
            access_token: format!("access-{}", n),
            refresh_token: format!("refresh-{}", n),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            expires_at: None,
        };
        data.access_tokens.insert(session.access_token.clone(), email.to_string());
        data.refresh_tokens.insert(session.refresh_token.clone(), email.to_string());
        session
    }

    pub fn is_access_token_live(&self, token: &str) -> bool {
        self.data.lock().unwrap().access_tokens.contains_key(token)
    }
}

#[async_trait]
impl AuthProvider for FakeProvider {
    async fn signup(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.signup_calls.fetch_add(1, Ordering::SeqCst);
        if self.data.lock().unwrap().users.contains_key(email) {
            return Err(AuthError::new(422, "User already registered").with_code("user_already_exists"));
        }
        let user = self.add_user(email, password);
        Ok(AuthSession { user, session: None })
    }

    async fn signin(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut data = self.data.lock().unwrap();
        let user = match data.users.get(email) {
            Some((stored, user)) if stored == password => user.clone(),
            _ => return Err(AuthError::new(400, "Invalid login credentials")),
        };
        let session = self.issue(&mut data, email);
        Ok(AuthSession {
            user,
            session: Some(session),
        })
    }

    async fn signout(&self, access_token: &str) -> Result<(), AuthError> {
        self.signout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_signout.load(Ordering::SeqCst) {
            return Err(AuthError::new(500, "Database error during logout"));
        }
        let mut data = self.data.lock().unwrap();
        match data.access_tokens.remove(access_token) {
            Some(email) => {
                data.refresh_tokens.retain(|_, e| *e != email);
                Ok(())
            }
            None => Err(AuthError::new(401, "invalid JWT: token is expired")),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, AuthError> {
        let mut data = self.data.lock().unwrap();
        let email = data
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| AuthError::new(400, "Invalid Refresh Token: Refresh Token Not Found"))?;
        Ok(self.issue(&mut data, &email))
    }

    async fn user_by_access_token(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let data = self.data.lock().unwrap();
        data.access_tokens
            .get(access_token)
            .and_then(|email| data.users.get(email))
            .map(|(_, user)| user.clone())
            .ok_or_else(|| AuthError::new(403, "invalid JWT: unable to parse or verify signature"))
    }
}

/// In-memory profile table
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<Vec<LocalProfile>>,
    pub fail_inserts: AtomicBool,
    pub unhealthy: AtomicBool,
}

impl MemoryProfileStore {
    pub fn all(&self) -> Vec<LocalProfile> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn insert(&self, profile: LocalProfile) {
        self.profiles.lock().unwrap().push(profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn create_profile(&self, profile: NewProfile) -> Result<LocalProfile, StorageError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::QueryError("relation \"user_profiles\" does not exist".to_string()));
        }
        let mut profiles = self.profiles.lock().unwrap();
        if profiles
            .iter()
            .any(|p| p.user_id == profile.user_id || p.email == profile.email)
        {
            return Err(StorageError::Duplicate(profile.email));
        }
        let stored = LocalProfile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            email: profile.email,
            fullname: profile.fullname,
            role: profile.role,
            avatar: None,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        };
        profiles.push(stored.clone());
        Ok(stored)
    }

    async fn profile_by_email(&self, email: &str) -> Result<Option<LocalProfile>, StorageError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(StorageError::ConnectionError("connection refused".to_string()));
        }
        Ok(())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub content_type: Option<String>,
    pub text: String,
    pub body: Value,
}

impl TestResponse {
    /// Full `Set-Cookie` line for `name`, if the response set it
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}=", name);
        self.set_cookies
            .iter()
            .find(|c| c.starts_with(&prefix))
            .map(String::as_str)
    }

    /// Value part of the `Set-Cookie` line for `name`
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.set_cookie(name).map(|line| {
            line.split(';')
                .next()
                .unwrap_or_default()
                .trim_start_matches(&format!("{}=", name))
                .to_string()
        })
    }

    pub fn cookie_has(&self, name: &str, attribute: &str) -> bool {
        self.set_cookie(name)
            .map(|line| line.split(';').any(|part| part.trim().eq_ignore_ascii_case(attribute)))
            .unwrap_or(false)
    }
}

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<FakeProvider>,
    pub profiles: Arc<MemoryProfileStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development, None)
    }

    pub fn with_environment(environment: Environment, cookie_domain: Option<&str>) -> Self {
        let provider = Arc::new(FakeProvider::default());
        let profiles = Arc::new(MemoryProfileStore::default());
        let state = AppState::new(
            provider.clone(),
            profiles.clone(),
            environment,
            cookie_domain.map(str::to_string),
        );
        let router = app(state, &["http://localhost:5173".to_string()]);
        Self {
            router,
            provider,
            profiles,
        }
    }

    /// Register a provider account and its local profile directly
    pub fn seed_user(&self, email: &str, fullname: &str) -> ProviderUser {
        let user = self.provider.add_user(email, PASSWORD);
        self.profiles.insert(LocalProfile {
            id: Uuid::new_v4(),
            user_id: user.id,
            email: email.to_string(),
            fullname: fullname.to_string(),
            role: auth_relay::database::Role::User,
            avatar: None,
            created_at: user.created_at,
            updated_at: user.created_at,
        });
        user
    }

    pub async fn post(&self, path: &str, body: Option<Value>, cookies: &[(&str, &str)]) -> Result<TestResponse> {
        let mut builder = Request::builder().method("POST").uri(path);

        if !cookies.is_empty() {
            let header_value = cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json)?)
            }
            None => Body::empty(),
        };

        self.send(builder.body(body)?).await
    }

    pub async fn get(&self, path: &str, accept: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router failed")?;

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(TestResponse {
            status,
            set_cookies,
            content_type,
            text,
            body,
        })
    }

    /// Log in and return (access token, refresh token) from the cookies
    pub async fn login(&self, email: &str, remember: bool) -> Result<(String, String)> {
        let res = self
            .post(
                "/api/auth/login",
                Some(json!({ "email": email, "password": PASSWORD, "remember": remember })),
                &[],
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.text);

        let access = res.cookie_value("accesstoken").context("missing accesstoken")?;
        let refresh = res.cookie_value("refreshtoken").context("missing refreshtoken")?;
        Ok((access, refresh))
    }
}
