// handlers/system.rs - root, health, 404 fallback and panic rendering

use std::any::Any;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "auth-relay",
            "version": version,
            "description": "Cookie-session authentication API backed by a managed auth provider",
            "endpoints": {
                "health": "/api/health",
                "auth": "/api/auth/{register,login,logout,profile,refresh} (POST)",
                "legacy": "/api/v01/{register,login,logout} (POST)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.profiles.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Server is healthy",
                "timestamp": now,
                "environment": state.environment.as_str(),
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "timestamp": now,
                    "environment": state.environment.as_str(),
                    "database": "unavailable"
                })),
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFoundFormat {
    Json,
    Html,
    Text,
}

/// Pick the 404 body format from `Accept`.
///
/// Each format scores the highest `q` among the ranges that match it
/// (exact type, `type/*` or `*/*`). The best score wins; ties go to JSON,
/// then HTML. Missing or blank `Accept` means JSON.
fn negotiate(accept: Option<&str>) -> NotFoundFormat {
    let Some(accept) = accept.filter(|a| !a.trim().is_empty()) else {
        return NotFoundFormat::Json;
    };

    let ranges: Vec<(String, f32)> = accept.split(',').filter_map(media_range).collect();

    let score = |candidates: &[&str]| {
        ranges
            .iter()
            .filter(|(media, _)| candidates.contains(&media.as_str()))
            .map(|(_, q)| *q)
            .fold(0.0_f32, f32::max)
    };

    let scored = [
        (NotFoundFormat::Json, score(&["application/json", "application/*", "*/*"])),
        (NotFoundFormat::Html, score(&["text/html", "text/*", "*/*"])),
        (NotFoundFormat::Text, score(&["text/plain", "text/*", "*/*"])),
    ];

    let mut best = (NotFoundFormat::Text, 0.0_f32);
    for (format, q) in scored {
        if q > best.1 {
            best = (format, q);
        }
    }
    best.0
}

// "text/html;q=0.8" -> ("text/html", 0.8); malformed weights count as 1
fn media_range(part: &str) -> Option<(String, f32)> {
    let mut pieces = part.split(';');
    let media = pieces.next()?.trim().to_ascii_lowercase();
    if media.is_empty() {
        return None;
    }

    let q = pieces
        .filter_map(|p| p.trim().strip_prefix("q=").map(|q| q.trim().parse::<f32>().unwrap_or(1.0)))
        .next()
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);

    Some((media, q))
}

pub async fn not_found(uri: Uri, headers: HeaderMap) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());

    match negotiate(accept) {
        NotFoundFormat::Json => ApiError::not_found(format!("Route {} not found", uri)).into_response(),
        NotFoundFormat::Html => (StatusCode::NOT_FOUND, Html("<h1>404 - Not Found</h1>")).into_response(),
        NotFoundFormat::Text => (StatusCode::NOT_FOUND, "Error 404: Not Found").into_response(),
    }
}

/// Last-resort renderer for panics caught by `CatchPanicLayer`
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Internal Server Error",
        })),
    )
        .into_response()
}
