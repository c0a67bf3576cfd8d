// handlers/auth/profile.rs - POST /profile handler

use axum::{extract::State, http::StatusCode, response::Response, Extension};
use axum_extra::extract::cookie::CookieJar;

use super::utils::{unauthorized_on_rejection, CurrentUser};
use crate::app::AppState;
use crate::error::{ApiError, AuthContext};
use crate::middleware::Envelope;

/// POST /profile - current user from the `accesstoken` cookie
pub async fn profile_post(
    State(state): State<AppState>,
    Extension(envelope): Extension<Envelope>,
    jar: CookieJar,
) -> Response {
    match profile(&state, &jar).await {
        Ok(user) => envelope.success(StatusCode::OK, "User profile fetched successfully", user),
        Err(err) => envelope.failure(err),
    }
}

async fn profile(state: &AppState, jar: &CookieJar) -> Result<CurrentUser, ApiError> {
    let token = state
        .cookies
        .access_token(jar)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let user = state
        .provider
        .user_by_access_token(&token)
        .await
        .map_err(|e| ApiError::auth(unauthorized_on_rejection(e), AuthContext::Profile))?;

    let profile = state.profiles.profile_by_email(&user.email).await?;
    Ok(CurrentUser::merge(&user, profile.as_ref()))
}
