// handlers/auth/logout.rs - POST /logout handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiError, AuthContext};
use crate::middleware::Envelope;

/// POST /logout - end the provider session and clear both cookies
///
/// Cookies are cleared on every outcome, so repeating a logout is harmless.
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(envelope): Extension<Envelope>,
    jar: CookieJar,
) -> Response {
    let access_token = state.cookies.access_token(&jar);
    let jar = state.cookies.clear(jar);

    let result = match access_token {
        Some(token) => signout(&state, &token).await,
        None => Ok(()),
    };

    let response = match result {
        Ok(()) if envelope.is_legacy() => envelope.success(
            StatusCode::OK,
            "Logout successful",
            json!({ "success": true, "message": "user logged out successfully" }),
        ),
        Ok(()) => envelope.success(StatusCode::OK, "User signed out successfully", Value::Null),
        Err(err) => envelope.failure(err),
    };

    (jar, response).into_response()
}

async fn signout(state: &AppState, access_token: &str) -> Result<(), ApiError> {
    match state.provider.signout(access_token).await {
        Ok(()) => Ok(()),
        // Expired or already revoked session: nothing left to end
        Err(err) if matches!(err.status, 401 | 403 | 404) => {
            tracing::debug!("Provider session already gone on logout: {}", err.message);
            Ok(())
        }
        Err(err) => Err(ApiError::auth(err, AuthContext::Signout)),
    }
}
