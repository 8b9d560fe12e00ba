//! Payment-session lookup endpoint
//!
//! Returns a sanitized projection of a provider checkout session. The full
//! provider payload can carry payer PII and is never forwarded to the
//! browser.

use super::{error_response, ApiState};
use crate::{
    givepay::{PaymentProjection, PaymentProvider},
    SiteError, SiteResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

/// Successful session-lookup response
#[derive(Debug, Serialize)]
pub struct PaymentSessionResponse {
    /// Always true on this path
    pub success: bool,
    /// The sanitized payment projection
    pub payment: PaymentProjection,
}

/// Fetch a session snapshot and project it down to the browser-safe fields
pub(crate) async fn fetch_payment(
    provider: &dyn PaymentProvider,
    session_id: &str,
) -> SiteResult<PaymentProjection> {
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return Err(SiteError::Validation(
            "Payment session ID is required".to_string(),
        ));
    }

    match provider.fetch_session(session_id).await {
        Ok(snapshot) => Ok(snapshot.sanitized()),
        // Validation, configuration and provider errors pass through; any
        // other failure gets this route's generic message
        Err(e @ (SiteError::Validation(_) | SiteError::Config(_) | SiteError::Provider { .. })) => {
            Err(e)
        }
        Err(_) => Err(SiteError::ProviderResponse(
            "Failed to retrieve payment information".to_string(),
        )),
    }
}

/// Handle `GET /api/payment-session/{id}`
pub async fn get_payment_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("API: payment session lookup: id={}", session_id);

    match fetch_payment(state.app.payments.as_ref(), &session_id).await {
        Ok(payment) => (
            StatusCode::OK,
            Json(PaymentSessionResponse {
                success: true,
                payment,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::givepay::{CheckoutPayload, SessionSnapshot};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake provider serving one canned session
    #[derive(Default)]
    struct FakeSessions {
        calls: AtomicUsize,
    }

    fn sample_session() -> SessionSnapshot {
        serde_json::from_value(serde_json::json!({
            "id": "sess_123",
            "status": "completed",
            "amount": 5000,
            "currency": "GBP",
            "payment_type": "one_time",
            "payer": { "email": "jo@example.org", "first_name": "Jo" },
            "line_items": [{ "amount": 5000, "intention": "General" }],
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[async_trait]
    impl PaymentProvider for FakeSessions {
        async fn create_checkout(&self, _payload: &CheckoutPayload) -> SiteResult<String> {
            unreachable!("session tests never create checkouts")
        }

        async fn fetch_session(&self, session_id: &str) -> SiteResult<SessionSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if session_id == "sess_123" {
                Ok(sample_session())
            } else {
                Err(SiteError::Provider {
                    status: 404,
                    message: "Payment session not found".to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_blank_id_never_reaches_the_provider() {
        let provider = FakeSessions::default();

        let err = fetch_payment(&provider, "   ").await.unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_known_session_is_projected_and_sanitized() {
        let provider = FakeSessions::default();

        let payment = fetch_payment(&provider, "sess_123").await.unwrap();
        assert_eq!(payment.id, "sess_123");
        assert_eq!(payment.amount, 5000);
        assert_eq!(payment.first_name.as_deref(), Some("Jo"));
        assert_eq!(payment.intention.as_deref(), Some("General"));
        assert!(!payment.is_subscription);

        let body = serde_json::to_string(&PaymentSessionResponse {
            success: true,
            payment,
        })
        .unwrap();
        assert!(!body.contains("jo@example.org"));
        assert!(body.contains("\"createdAt\":\"2024-01-01T00:00:00Z\""));
    }

    #[tokio::test]
    async fn test_unknown_session_propagates_provider_status() {
        let provider = FakeSessions::default();

        let err = fetch_payment(&provider, "sess_missing").await.unwrap_err();
        match err {
            SiteError::Provider { status, .. } => assert_eq!(status, 404),
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
