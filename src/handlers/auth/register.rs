// handlers/auth/register.rs - POST /register handler

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};

use crate::app::AppState;
use crate::database::{LocalProfile, NewProfile, Role};
use crate::error::{ApiError, AuthContext};
use crate::middleware::Envelope;
use crate::validation::{self, RegisterRequest};

/// POST /register - create the provider account, then the local profile
///
/// Input: `{ "fullname", "email", "password", "terms": true }`
///
/// Responds 201 with the stored profile. The password never leaves this
/// handler except towards the provider.
pub async fn register_post(
    State(state): State<AppState>,
    Extension(envelope): Extension<Envelope>,
    body: Bytes,
) -> Response {
    match register(&state, &body).await {
        Ok(profile) => envelope.success(StatusCode::CREATED, "Registration successful", profile),
        Err(err) => envelope.failure(err),
    }
}

async fn register(state: &AppState, body: &[u8]) -> Result<LocalProfile, ApiError> {
    let request: RegisterRequest = validation::parse(body)?;

    let created = state
        .provider
        .signup(&request.email, &request.password)
        .await
        .map_err(|e| ApiError::auth(e, AuthContext::Signup))?;

    let user = created.user;
    tracing::info!("Provider account created for user {}", user.id);

    let new_profile = NewProfile {
        user_id: user.id,
        email: request.email,
        fullname: request.fullname,
        role: Role::User,
        created_at: user.created_at,
        updated_at: user.updated_at(),
    };

    // No rollback: the provider account stays if this fails
    state.profiles.create_profile(new_profile).await.map_err(|e| {
        tracing::error!(
            "Profile creation failed after provider signup; user {} has no local profile: {}",
            user.id,
            e
        );
        ApiError::from(e)
    })
}
