//! Health check endpoint

use super::ApiState;
use axum::{extract::State, response::Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Deployment environment
    pub environment: String,
    /// Whether the CMS is configured (pages fall back to defaults otherwise)
    pub content_configured: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.app.config.site.environment.clone(),
        content_configured: state.app.content.is_configured(),
    })
}
