use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Environment;
use crate::error::ApiError;

/// Response-shape strategy, picked when a route set is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `/api/auth`: `{success, message, data}`
    Current,
    /// `/api/v01`: `{status, message, data}`
    Legacy,
}

/// Renders success and failure bodies for one API surface
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub shape: ResponseShape,
    pub environment: Environment,
}

impl Envelope {
    pub fn new(shape: ResponseShape, environment: Environment) -> Self {
        Self { shape, environment }
    }

    pub fn is_legacy(&self) -> bool {
        self.shape == ResponseShape::Legacy
    }

    /// Wrap `data` in the success envelope
    pub fn success<T: Serialize>(&self, status: StatusCode, message: &str, data: T) -> Response {
        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return self.failure(ApiError::internal_server_error("Failed to serialize response data"));
            }
        };

        let envelope = match self.shape {
            ResponseShape::Current => json!({
                "success": true,
                "message": message,
                "data": data_value,
            }),
            ResponseShape::Legacy => json!({
                "status": "success",
                "message": message,
                "data": data_value,
            }),
        };

        (status, Json(envelope)).into_response()
    }

    /// Render an error; logs it on the way out
    pub fn failure(&self, err: ApiError) -> Response {
        err.log();

        match self.shape {
            ResponseShape::Current => {
                let mut body = err.to_json();
                if !self.environment.is_production() && err.status_code().is_server_error() {
                    body["error"] = json!(err.error_code());
                    body["stack"] = json!(err.debug_detail());
                }
                (err.status_code(), Json(body)).into_response()
            }
            ResponseShape::Legacy => {
                let (status, body) = legacy_failure(&err);
                (status, Json(body)).into_response()
            }
        }
    }
}

// v01 only ever distinguished bad input from everything else
fn legacy_failure(err: &ApiError) -> (StatusCode, Value) {
    match err {
        ApiError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            json!({
                "status": "failed",
                "message": "Invalid input",
                "errors": errors,
            }),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "status": "error",
                "message": "Internal server error",
                "details": other.message(),
            }),
        ),
    }
}
