// handlers/auth/refresh.rs - POST /refresh handler

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use super::utils::unauthorized_on_rejection;
use crate::app::AppState;
use crate::error::{ApiError, AuthContext};
use crate::middleware::Envelope;
use crate::validation::{self, RefreshRequest};

/// POST /refresh - trade the `refreshtoken` cookie for a new pair
///
/// Input (optional): `{ "remember": bool }` selecting the new cookie lifetimes.
/// Cookies are left untouched when the provider rejects the token.
pub async fn refresh_post(
    State(state): State<AppState>,
    Extension(envelope): Extension<Envelope>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    match refresh(&state, jar, &body).await {
        Ok(jar) => (
            jar,
            envelope.success(StatusCode::OK, "Tokens are refreshed successfully", Value::Null),
        )
            .into_response(),
        Err(err) => envelope.failure(err),
    }
}

async fn refresh(state: &AppState, jar: CookieJar, body: &[u8]) -> Result<CookieJar, ApiError> {
    let refresh_token = state
        .cookies
        .refresh_token(&jar)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let request: RefreshRequest = validation::parse(body)?;

    let session = state
        .provider
        .refresh(&refresh_token)
        .await
        .map_err(|e| ApiError::auth(unauthorized_on_rejection(e), AuthContext::RefreshToken))?;

    Ok(state.cookies.issue(jar, &session, request.remember))
}
