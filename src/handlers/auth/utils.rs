use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::{LocalProfile, Role};
use crate::provider::{AuthError, ProviderUser};

/// Merged provider user + local profile, as returned by login and profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    /// Local profile id; null when the user has no profile row yet
    pub id: Option<Uuid>,
    pub email: String,
    pub role: Role,
    pub fullname: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "isUserVerified")]
    pub is_user_verified: bool,
}

impl CurrentUser {
    pub fn merge(user: &ProviderUser, profile: Option<&LocalProfile>) -> Self {
        Self {
            id: profile.map(|p| p.id),
            email: user.email.clone(),
            role: profile.map(|p| p.role).unwrap_or_default(),
            fullname: profile.map(|p| p.fullname.clone()).unwrap_or_default(),
            avatar: profile.and_then(|p| p.avatar.clone()),
            created_at: user.created_at,
            updated_at: user.updated_at(),
            is_user_verified: user.is_verified(),
        }
    }
}

/// Provider rejections of credentials or tokens surface as 401.
/// Rate limiting keeps its own status.
pub fn unauthorized_on_rejection(err: AuthError) -> AuthError {
    if err.is_rejection() && err.status != 429 {
        AuthError { status: 401, ..err }
    } else {
        err
    }
}
