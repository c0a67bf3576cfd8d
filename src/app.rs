use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::ProfileStore;
use crate::handlers::{auth, system};
use crate::middleware::{Envelope, ResponseShape};
use crate::provider::AuthProvider;
use crate::session::{CookieOptions, SessionCookies};

/// Immutable per-process state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub cookies: SessionCookies,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        environment: Environment,
        cookie_domain: Option<String>,
    ) -> Self {
        let cookies = SessionCookies::new(CookieOptions::for_environment(&environment, cookie_domain));
        Self {
            provider,
            profiles,
            cookies,
            environment,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self::new(
            provider,
            profiles,
            config.environment,
            config.security.cookie_domain.clone(),
        )
    }
}

pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let environment = state.environment;

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/api/health", get(system::health))
        // Auth surfaces: one controller set, two envelopes
        .nest("/api/auth", auth_routes(Envelope::new(ResponseShape::Current, environment)))
        .nest("/api/v01", legacy_auth_routes(Envelope::new(ResponseShape::Legacy, environment)))
        .fallback(system::not_found)
        // Global middleware
        .layer(CatchPanicLayer::custom(system::panic_response))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(envelope: Envelope) -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
        .route("/logout", post(auth::logout_post))
        .route("/profile", post(auth::profile_post))
        .route("/refresh", post(auth::refresh_post))
        .layer(Extension(envelope))
}

// v01 never exposed profile or refresh
fn legacy_auth_routes(envelope: Envelope) -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
        .route("/logout", post(auth::logout_post))
        .layer(Extension(envelope))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::SET_COOKIE])
}
