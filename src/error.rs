// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

use crate::database::StorageError;
use crate::provider::AuthError;
use crate::validation::FieldError;

/// Which controller raised a provider error; echoed back as `context`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    Signup,
    Signin,
    Signout,
    Profile,
    RefreshToken,
}

impl AuthContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthContext::Signup => "signup",
            AuthContext::Signin => "signin",
            AuthContext::Signout => "signout",
            AuthContext::Profile => "profile",
            AuthContext::RefreshToken => "refreshToken",
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    // Status carried by the provider (default 500)
    #[error("{source}")]
    Auth { source: AuthError, context: AuthContext },

    // 500 Internal Server Error (409 for duplicates)
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }

    pub fn auth(source: AuthError, context: AuthContext) -> Self {
        ApiError::Auth { source, context }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth { source, .. } => {
                StatusCode::from_u16(source.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Storage(StorageError::Duplicate(_)) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(_) => "Invalid input".to_string(),
            ApiError::Auth { source, .. } => source.friendly_message(),
            // Don't expose SQL details to clients
            ApiError::Storage(StorageError::Duplicate(_)) => "Resource already exists".to_string(),
            ApiError::Storage(_) => "An error occurred while saving your profile".to_string(),
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth { .. } => "AUTH_ERROR",
            ApiError::Storage(StorageError::Duplicate(_)) => "CONFLICT",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Internal detail for non-production responses (never shown in production)
    pub fn debug_detail(&self) -> String {
        match self {
            ApiError::Auth { source, .. } => format!("{:?}", source),
            ApiError::Storage(err) => format!("{:?}", err),
            other => other.to_string(),
        }
    }

    /// Log according to severity; 5xx are errors, the rest warnings
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code = self.error_code(), "{}", self.debug_detail());
        } else {
            tracing::warn!(status = status.as_u16(), code = self.error_code(), "{}", self);
        }
    }

    /// Convert to JSON response body (current envelope, no debug detail)
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
        });

        match self {
            ApiError::Validation(errors) => {
                body["errors"] = json!(errors);
            }
            ApiError::Auth { context, .. } => {
                body["context"] = json!(context.as_str());
            }
            _ => {}
        }

        body
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
