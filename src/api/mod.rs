//! HTTP surface of the site
//!
//! This module provides:
//! - The JSON gateway endpoints (donation checkout, payment-session lookup,
//!   email signups)
//! - The server-rendered content pages (mounted from [`crate::pages`])
//! - A health check
//!
//! Every JSON failure path returns a single `{"error": "<string>"}` body; the
//! donation UI surfaces that string inline next to the submit action.

use crate::{pages, SiteApp, SiteError};
use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod checkout;
mod health;
mod payment_session;
mod subscribe;

pub use checkout::*;
pub use health::*;
pub use payment_session::*;
pub use subscribe::*;

/// API state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    /// The site application
    pub app: SiteApp,
}

/// Build the full router: JSON API plus content pages
fn build_router(app: SiteApp) -> Router {
    let state = ApiState { app };

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Gateway endpoints
        .route("/api/checkout", post(create_checkout))
        .route("/api/payment-session/:id", get(get_payment_session))
        .route("/api/subscribe", post(subscribe))
        // Server-rendered content pages
        .merge(pages::router())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(app: SiteApp) -> anyhow::Result<()> {
    serve_with_shutdown(app, tokio::sync::oneshot::channel().1).await
}

/// Start the HTTP server with graceful shutdown
pub async fn serve_with_shutdown(
    app: SiteApp,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let config = app.config.clone();

    let router = build_router(app);

    // Add CORS if enabled
    let router = if config.server.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    let addr: std::net::SocketAddr = config
        .server
        .bind_address
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("Received shutdown signal, stopping server...");
        })
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// JSON error body: every failure returns exactly this shape
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// User-readable error message
    pub error: String,
}

/// Map a site error to its HTTP status and user-facing `{error}` body.
///
/// Validation messages pass through as written; configuration and unexpected
/// failures only ever show a generic message (specifics are logged, never
/// echoed); provider errors propagate the provider's own HTTP status.
pub fn error_response(err: &SiteError) -> (StatusCode, Json<ErrorBody>) {
    let (status, message) = match err {
        SiteError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        SiteError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        SiteError::Provider { status, message } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            message.clone(),
        ),
        SiteError::ProviderResponse(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        SiteError::Content(_) | SiteError::Unexpected(_) => {
            error!("Unhandled server error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            )
        }
    };

    (status, Json(ErrorBody { error: message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_statuses() {
        let (status, body) = error_response(&SiteError::Validation("bad amount".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "bad amount");

        let (status, _) =
            error_response(&SiteError::Config("Payment service not configured".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = error_response(&SiteError::Provider {
            status: 404,
            message: "Payment session not found".into(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Payment session not found");
    }

    #[test]
    fn test_unexpected_errors_never_leak_details() {
        let (status, body) =
            error_response(&SiteError::Unexpected("stack trace with secrets".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Something went wrong. Please try again.");
    }

    #[test]
    fn test_bogus_provider_status_falls_back_to_bad_gateway() {
        let (status, _) = error_response(&SiteError::Provider {
            status: 42,
            message: "weird".into(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
