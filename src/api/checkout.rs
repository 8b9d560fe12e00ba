//! Donation checkout endpoint

use super::{error_response, ApiState};
use crate::{
    givepay::{build_checkout_payload, DonationRequest, PaymentProvider},
    Config, SiteResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

/// Successful checkout response: the redirect URL and nothing else
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Always true on this path
    pub success: bool,
    /// Provider-hosted checkout page to redirect the browser to
    pub checkout_url: String,
}

/// Validate a donation request and create a provider checkout session.
///
/// Validation failures return before any provider call is made.
pub(crate) async fn process_checkout(
    config: &Config,
    provider: &dyn PaymentProvider,
    req: &DonationRequest,
) -> SiteResult<String> {
    req.validate()?;

    let payload = build_checkout_payload(req, &config.givepay, config.https_base_url());
    provider.create_checkout(&payload).await
}

/// Handle `POST /api/checkout`
pub async fn create_checkout(
    State(state): State<ApiState>,
    Json(req): Json<DonationRequest>,
) -> impl IntoResponse {
    info!(
        "API: checkout request: amount={}, type={:?}, project={:?}",
        req.amount, req.payment_type, req.project
    );

    match process_checkout(&state.app.config, state.app.payments.as_ref(), &req).await {
        Ok(checkout_url) => (
            StatusCode::OK,
            Json(CheckoutResponse {
                success: true,
                checkout_url,
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
    use crate::{SiteError, SiteResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting fake provider: returns a fixed URL and records every call
    #[derive(Default)]
    struct FakePayments {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentProvider for FakePayments {
        async fn create_checkout(&self, _payload: &CheckoutPayload) -> SiteResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("https://pay.example/abc".to_string())
        }

        async fn fetch_session(&self, _session_id: &str) -> SiteResult<SessionSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SiteError::Provider {
                status: 404,
                message: "Payment session not found".to_string(),
            })
        }
    }

    fn donation(amount: i64, email: &str) -> DonationRequest {
        DonationRequest {
            amount,
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_small_amount_never_reaches_the_provider() {
        let provider = FakePayments::default();
        let config = Config::default();

        let err = process_checkout(&config, &provider, &donation(99, "jo@example.org"))
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_email_never_reaches_the_provider() {
        let provider = FakePayments::default();
        let config = Config::default();

        let err = process_checkout(&config, &provider, &donation(500, "no-at-sign"))
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_donation_returns_the_provider_url() {
        let provider = FakePayments::default();
        let config = Config::default();

        let url = process_checkout(&config, &provider, &donation(500, "jo@example.org"))
            .await
            .unwrap();

        assert_eq!(url, "https://pay.example/abc");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checkout_response_wire_shape() {
        let json = serde_json::to_value(CheckoutResponse {
            success: true,
            checkout_url: "https://pay.example/abc".to_string(),
        })
        .unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["checkoutUrl"], "https://pay.example/abc");
    }
}
