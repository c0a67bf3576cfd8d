// handlers/auth/login.rs - POST /login handler

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::utils::{unauthorized_on_rejection, CurrentUser};
use crate::app::AppState;
use crate::error::{ApiError, AuthContext};
use crate::middleware::Envelope;
use crate::provider::AuthError;
use crate::validation::{self, LoginRequest};

/// POST /login - verify credentials with the provider and issue cookies
///
/// Input: `{ "email", "password", "remember"?: bool }`
///
/// On success sets `accesstoken` and `refreshtoken` and returns the merged
/// provider + profile view. A failed sign-in sets no cookies.
pub async fn login_post(
    State(state): State<AppState>,
    Extension(envelope): Extension<Envelope>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    match login(&state, jar, &body).await {
        Ok((jar, user)) if envelope.is_legacy() => {
            (jar, envelope.success(StatusCode::OK, "Login successful", json!({ "currentUser": user })))
                .into_response()
        }
        Ok((jar, user)) => {
            (jar, envelope.success(StatusCode::OK, "User signed in successfully.", user)).into_response()
        }
        Err(err) => envelope.failure(err),
    }
}

async fn login(state: &AppState, jar: CookieJar, body: &[u8]) -> Result<(CookieJar, CurrentUser), ApiError> {
    let request: LoginRequest = validation::parse(body)?;
    tracing::debug!("Sign-in attempt for {}", request.email);

    let signed_in = state
        .provider
        .signin(&request.email, &request.password)
        .await
        .map_err(|e| ApiError::auth(unauthorized_on_rejection(e), AuthContext::Signin))?;

    let session = signed_in
        .session
        .ok_or_else(|| ApiError::auth(AuthError::token_generation_failed(), AuthContext::Signin))?;

    let profile = state.profiles.profile_by_email(&request.email).await?;
    if profile.is_none() {
        tracing::warn!("User {} signed in without a local profile", signed_in.user.id);
    }

    let jar = state.cookies.issue(jar, &session, request.remember);
    Ok((jar, CurrentUser::merge(&signed_in.user, profile.as_ref())))
}
