//! GivePay payment API integration
//!
//! This module is a thin validating proxy in front of the GivePay checkout
//! API:
//!
//! - Donation validation and checkout payload construction (pure, no I/O)
//! - Checkout-session creation returning the provider's redirect URL
//! - Session lookup returning a sanitized projection that never exposes more
//!   of the payer record than the first name
//!
//! Failures are terminal for the request; the browser lets the user retry.

use crate::{
    config::GivePayConfig,
    SiteError, SiteResult,
};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Donation payment type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Single donation
    #[default]
    OneTime,
    /// Recurring monthly donation
    Subscription,
}

/// A donation checkout request as submitted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    /// Amount in minor currency units (pence); never fractional
    #[serde(default)]
    pub amount: i64,
    /// One-time or subscription
    #[serde(default)]
    pub payment_type: PaymentType,
    /// Payer email address
    #[serde(default)]
    pub email: String,
    /// Payer first name
    pub first_name: Option<String>,
    /// Payer last name
    pub last_name: Option<String>,
    /// Free-text earmark label, e.g. "General"
    pub intention: Option<String>,
    /// Mission/story/event slug the donation is for
    pub project: Option<String>,
    /// Number of months per subscription charge (default 1)
    pub interval_count: Option<u32>,
}

impl DonationRequest {
    /// Validate the request. Runs before any network call; a failure here
    /// never reaches the provider.
    pub fn validate(&self) -> SiteResult<()> {
        if self.amount < 100 {
            return Err(SiteError::Validation(
                "Please provide a valid amount (minimum £1)".to_string(),
            ));
        }

        if !self.email.contains('@') {
            return Err(SiteError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }

        Ok(())
    }
}

/// One donation component within a checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Always 1; the amount carries the full donation
    pub quantity: u32,
    /// Amount in minor currency units
    pub amount: i64,
    /// Earmark label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
    /// Mission/story/event slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Payer details forwarded to the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payer {
    /// Payer email, lowercased
    pub email: String,
    /// First name, only when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name, only when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Subscription descriptor attached for monthly donations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    /// Billing interval unit; always "month"
    pub interval: String,
    /// Number of intervals per charge
    pub interval_count: u32,
    /// Human-readable name shown on the provider's checkout page
    pub name: String,
}

/// The checkout request sent to the GivePay API
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutPayload {
    /// One-time or subscription
    pub payment_type: PaymentType,
    /// Donation currency (ISO 4217)
    pub currency: String,
    /// Exactly one line item per checkout
    pub line_items: Vec<LineItem>,
    /// Payer details
    pub payer: Payer,
    /// Post-payment redirect; only attached on HTTPS deployments because the
    /// provider rejects insecure redirect targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Present only for subscription payments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionSpec>,
}

/// Build the provider checkout payload from a validated donation request.
///
/// Pure function: normalizes the payer email to lowercase, builds the single
/// line item, attaches the return URL only when the public base URL is HTTPS,
/// and adds the monthly subscription descriptor when requested.
pub fn build_checkout_payload(
    req: &DonationRequest,
    config: &GivePayConfig,
    https_base_url: Option<&str>,
) -> CheckoutPayload {
    let line_item = LineItem {
        quantity: 1,
        amount: req.amount,
        intention: req.intention.clone(),
        project: req.project.clone(),
    };

    let subscription = match req.payment_type {
        PaymentType::Subscription => Some(SubscriptionSpec {
            interval: "month".to_string(),
            interval_count: req.interval_count.unwrap_or(1).max(1),
            name: format!("Monthly Donation - £{:.2}", req.amount as f64 / 100.0),
        }),
        PaymentType::OneTime => None,
    };

    CheckoutPayload {
        payment_type: req.payment_type,
        currency: config.currency.clone(),
        line_items: vec![line_item],
        payer: Payer {
            email: req.email.to_lowercase(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
        },
        // The provider appends ?session={session_id} on redirect
        return_url: https_base_url.map(|base| format!("{}/success", base)),
        subscription,
    }
}

/// Payer details as returned by the provider's session lookup
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPayer {
    /// Payer email; never forwarded to the browser
    pub email: Option<String>,
    /// Payer first name
    pub first_name: Option<String>,
    /// Payer last name; never forwarded to the browser
    pub last_name: Option<String>,
}

/// A line item as returned by the provider's session lookup
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLineItem {
    /// Amount in minor currency units
    pub amount: i64,
    /// Earmark label
    pub intention: Option<String>,
    /// Mission/story/event slug
    pub project: Option<String>,
}

/// A checkout-session snapshot as returned by the provider.
///
/// Externally owned and read-only; this system never mutates it.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSnapshot {
    /// Opaque session identifier
    pub id: String,
    /// Provider-defined status, e.g. "completed"
    pub status: String,
    /// Total amount in minor currency units
    pub amount: i64,
    /// Currency (ISO 4217)
    pub currency: String,
    /// One-time or subscription
    pub payment_type: PaymentType,
    /// Payer record; sanitized before leaving this process
    pub payer: Option<SessionPayer>,
    /// Line items; only the first item's intention is surfaced
    pub line_items: Option<Vec<SessionLineItem>>,
    /// Subscription descriptor, when recurring
    pub subscription: Option<SubscriptionSpec>,
    /// Provider creation timestamp (passed through verbatim)
    pub created_at: String,
}

/// The minimal payment projection exposed to the browser.
///
/// This is an explicit least-exposure boundary: the full provider payload may
/// carry payer PII and is never forwarded beyond the first name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProjection {
    /// Session identifier
    pub id: String,
    /// Provider-defined status
    pub status: String,
    /// Amount in minor currency units
    pub amount: i64,
    /// Currency (ISO 4217)
    pub currency: String,
    /// One-time or subscription
    pub payment_type: PaymentType,
    /// Payer first name, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// First line item's earmark label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
    /// Derived: payment_type == subscription
    pub is_subscription: bool,
    /// Subscription interval, when recurring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_interval: Option<String>,
    /// Provider creation timestamp
    pub created_at: String,
}

impl SessionSnapshot {
    /// Project the snapshot down to the fields safe to show the browser
    pub fn sanitized(self) -> PaymentProjection {
        let is_subscription = self.payment_type == PaymentType::Subscription;
        PaymentProjection {
            id: self.id,
            status: self.status,
            amount: self.amount,
            currency: self.currency,
            payment_type: self.payment_type,
            first_name: self.payer.and_then(|p| p.first_name),
            intention: self
                .line_items
                .and_then(|items| items.into_iter().next())
                .and_then(|item| item.intention),
            is_subscription,
            subscription_interval: self.subscription.map(|s| s.interval),
            created_at: self.created_at,
        }
    }
}

/// Payment provider interface.
///
/// One concrete adapter talks to GivePay; tests substitute a counting fake.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session and return the redirect URL
    async fn create_checkout(&self, payload: &CheckoutPayload) -> SiteResult<String>;

    /// Fetch a checkout-session snapshot by its opaque identifier
    async fn fetch_session(&self, session_id: &str) -> SiteResult<SessionSnapshot>;
}

/// Successful checkout-creation response from the provider
#[derive(Debug, Deserialize)]
struct CheckoutCreated {
    checkout_url: String,
}

/// Normalize a raw checkout response into the redirect URL or a typed error.
///
/// Non-success responses surface the provider's own `message`/`error` field
/// verbatim when present, else a generic failure string, always carrying the
/// provider's HTTP status. An unparseable body is a provider error with a
/// generic message; the raw body is logged for diagnosis. On success only
/// the redirect URL is extracted.
fn normalize_checkout_response(
    status: u16,
    body: &str,
    development: bool,
) -> SiteResult<String> {
    let ok = (200..300).contains(&status);

    let data: serde_json::Value = serde_json::from_str(body).map_err(|_| {
        error!("Failed to parse GivePay response: {}", body);
        SiteError::ProviderResponse("Invalid response from payment service".to_string())
    })?;

    if !ok {
        error!("GivePay error: {}", data);

        // The sandbox rejects checkouts until a payment provider is wired up
        // in the GivePay dashboard; in development, surface that as an
        // actionable diagnostic instead of the raw provider message.
        let provider_error = data.get("error").and_then(|v| v.as_str()).unwrap_or("");
        if development && provider_error.contains("provider configured") {
            return Err(SiteError::Provider {
                status,
                message: "GivePay sandbox not fully configured. Please configure a \
                          payment provider in your GivePay dashboard."
                    .to_string(),
            });
        }

        let message = data
            .get("message")
            .and_then(|v| v.as_str())
            .or_else(|| data.get("error").and_then(|v| v.as_str()))
            .unwrap_or("Failed to create checkout session");
        return Err(SiteError::Provider {
            status,
            message: message.to_string(),
        });
    }

    let created: CheckoutCreated = serde_json::from_value(data).map_err(|_| {
        error!("GivePay success response missing checkout_url: {}", body);
        SiteError::ProviderResponse("Invalid response from payment service".to_string())
    })?;

    Ok(created.checkout_url)
}

/// HTTP client for the GivePay API
pub struct GivePayClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    development: bool,
}

impl GivePayClient {
    /// Create a new GivePay client
    pub fn new(http: reqwest::Client, config: &GivePayConfig, development: bool) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            development,
        }
    }

    fn api_key(&self) -> SiteResult<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => {
                error!("GivePay API key not configured");
                Err(SiteError::Config(
                    "Payment service not configured".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl PaymentProvider for GivePayClient {
    async fn create_checkout(&self, payload: &CheckoutPayload) -> SiteResult<String> {
        let api_key = self.api_key()?;

        info!(
            "GivePay checkout request: {}",
            serde_json::to_string(payload).unwrap_or_default()
        );

        let response = self
            .http
            .post(format!("{}/api/v1/payment-session/checkout", self.api_url))
            .header(AUTHORIZATION, api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!("GivePay request failed: {}", e);
                SiteError::Unexpected(format!("GivePay request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read GivePay response: {}", e);
            SiteError::Unexpected(format!("Failed to read GivePay response: {}", e))
        })?;

        info!("GivePay response status: {}", status);
        debug!("GivePay response: {}", body);

        normalize_checkout_response(status.as_u16(), &body, self.development)
    }

    async fn fetch_session(&self, session_id: &str) -> SiteResult<SessionSnapshot> {
        let api_key = self.api_key()?;

        debug!("Fetching GivePay session {}", session_id);

        let response = self
            .http
            .get(format!(
                "{}/api/v1/payment-session/{}",
                self.api_url, session_id
            ))
            .header(AUTHORIZATION, api_key)
            .send()
            .await
            .map_err(|e| {
                error!("GivePay session fetch failed: {}", e);
                SiteError::Unexpected(format!("GivePay session fetch failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("GivePay session fetch error: {}", status);
            return Err(SiteError::Provider {
                status: status.as_u16(),
                message: "Payment session not found".to_string(),
            });
        }

        response.json::<SessionSnapshot>().await.map_err(|e| {
            error!("Failed to parse GivePay session response: {}", e);
            SiteError::ProviderResponse(
                "Failed to retrieve payment information".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(amount: i64, email: &str) -> DonationRequest {
        DonationRequest {
            amount,
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_small_amounts() {
        for amount in [0, 1, 50, 99] {
            let err = donation(amount, "jo@example.org").validate().unwrap_err();
            match err {
                SiteError::Validation(msg) => assert!(msg.contains("minimum £1")),
                other => panic!("expected validation error, got {:?}", other),
            }
        }

        assert!(donation(100, "jo@example.org").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let err = donation(500, "not-an-email").validate().unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));

        let err = donation(500, "").validate().unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn test_payload_has_one_line_item_and_lowercased_email() {
        let mut req = donation(2500, "Jo.Bloggs@Example.ORG");
        req.intention = Some("General".to_string());
        req.project = Some("guatemala-2024".to_string());

        let payload = build_checkout_payload(&req, &GivePayConfig::default(), None);

        assert_eq!(payload.line_items.len(), 1);
        assert_eq!(payload.line_items[0].quantity, 1);
        assert_eq!(payload.line_items[0].amount, 2500);
        assert_eq!(payload.line_items[0].intention.as_deref(), Some("General"));
        assert_eq!(
            payload.line_items[0].project.as_deref(),
            Some("guatemala-2024")
        );
        assert_eq!(payload.payer.email, "jo.bloggs@example.org");
        assert_eq!(payload.currency, "GBP");
        assert!(payload.subscription.is_none());
    }

    #[test]
    fn test_return_url_only_on_https_deployments() {
        let req = donation(500, "jo@example.org");

        let plain = build_checkout_payload(&req, &GivePayConfig::default(), None);
        assert!(plain.return_url.is_none());

        let secure = build_checkout_payload(
            &req,
            &GivePayConfig::default(),
            Some("https://www.dentalaidnetwork.org"),
        );
        assert_eq!(
            secure.return_url.as_deref(),
            Some("https://www.dentalaidnetwork.org/success")
        );
    }

    #[test]
    fn test_subscription_descriptor() {
        let mut req = donation(2500, "jo@example.org");
        req.payment_type = PaymentType::Subscription;

        let payload = build_checkout_payload(&req, &GivePayConfig::default(), None);
        let sub = payload.subscription.expect("subscription descriptor");
        assert_eq!(sub.interval, "month");
        assert_eq!(sub.interval_count, 1);
        assert_eq!(sub.name, "Monthly Donation - £25.00");

        req.interval_count = Some(3);
        let payload = build_checkout_payload(&req, &GivePayConfig::default(), None);
        assert_eq!(payload.subscription.unwrap().interval_count, 3);
    }

    #[test]
    fn test_payload_serializes_snake_case_wire_format() {
        let mut req = donation(500, "jo@example.org");
        req.payment_type = PaymentType::Subscription;
        let payload = build_checkout_payload(&req, &GivePayConfig::default(), None);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["payment_type"], "subscription");
        assert_eq!(json["line_items"][0]["quantity"], 1);
        assert_eq!(json["payer"]["email"], "jo@example.org");
        // Omitted optionals must not appear as nulls on the wire
        assert!(json.get("return_url").is_none());
        assert!(json["line_items"][0].get("intention").is_none());
    }

    #[test]
    fn test_checkout_response_success_extracts_only_the_url() {
        let body = r#"{"checkout_url": "https://pay.example/abc", "internal_ref": "x9"}"#;
        let url = normalize_checkout_response(200, body, false).unwrap();
        assert_eq!(url, "https://pay.example/abc");
    }

    #[test]
    fn test_checkout_response_prefers_provider_message() {
        let body = r#"{"message": "Card declined", "error": "card_declined"}"#;
        let err = normalize_checkout_response(402, body, false).unwrap_err();
        match err {
            SiteError::Provider { status, message } => {
                assert_eq!(status, 402);
                assert_eq!(message, "Card declined");
            }
            other => panic!("expected provider error, got {:?}", other),
        }

        // Without message or error fields, fall back to the generic string
        let err = normalize_checkout_response(500, "{}", false).unwrap_err();
        match err {
            SiteError::Provider { message, .. } => {
                assert_eq!(message, "Failed to create checkout session");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_checkout_response_dev_diagnostic_for_unconfigured_sandbox() {
        let body = r#"{"error": "no payment provider configured"}"#;

        let err = normalize_checkout_response(400, body, true).unwrap_err();
        match err {
            SiteError::Provider { message, .. } => {
                assert!(message.contains("GivePay sandbox not fully configured"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }

        // In production the provider message passes through verbatim
        let err = normalize_checkout_response(400, body, false).unwrap_err();
        match err {
            SiteError::Provider { message, .. } => {
                assert_eq!(message, "no payment provider configured");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_checkout_response_malformed_body() {
        let err = normalize_checkout_response(200, "<html>bad gateway</html>", false).unwrap_err();
        assert!(matches!(err, SiteError::ProviderResponse(_)));

        // A success body without checkout_url is just as unusable
        let err = normalize_checkout_response(200, "{}", false).unwrap_err();
        assert!(matches!(err, SiteError::ProviderResponse(_)));
    }

    #[test]
    fn test_session_sanitization() {
        let raw = serde_json::json!({
            "id": "sess_123",
            "status": "completed",
            "amount": 5000,
            "currency": "GBP",
            "payment_type": "one_time",
            "payer": {
                "email": "jo@example.org",
                "first_name": "Jo",
                "last_name": "Bloggs"
            },
            "line_items": [{ "amount": 5000, "intention": "General" }],
            "created_at": "2024-01-01T00:00:00Z"
        });

        let snapshot: SessionSnapshot = serde_json::from_value(raw).unwrap();
        let payment = snapshot.sanitized();

        assert_eq!(payment.id, "sess_123");
        assert_eq!(payment.status, "completed");
        assert_eq!(payment.amount, 5000);
        assert!(!payment.is_subscription);
        assert_eq!(payment.first_name.as_deref(), Some("Jo"));
        assert_eq!(payment.intention.as_deref(), Some("General"));
        assert_eq!(payment.subscription_interval, None);

        // The serialized projection must not leak payer PII beyond the
        // first name.
        let json = serde_json::to_string(&payment).unwrap();
        assert!(!json.contains("jo@example.org"));
        assert!(!json.contains("Bloggs"));
        assert!(json.contains("\"firstName\":\"Jo\""));
        assert!(json.contains("\"isSubscription\":false"));
    }

    #[test]
    fn test_subscription_session_projection() {
        let raw = serde_json::json!({
            "id": "sess_456",
            "status": "completed",
            "amount": 1000,
            "currency": "GBP",
            "payment_type": "subscription",
            "subscription": {
                "interval": "month",
                "interval_count": 1,
                "name": "Monthly Donation - £10.00"
            },
            "created_at": "2024-02-01T00:00:00Z"
        });

        let payment: PaymentProjection =
            serde_json::from_value::<SessionSnapshot>(raw).unwrap().sanitized();
        assert!(payment.is_subscription);
        assert_eq!(payment.subscription_interval.as_deref(), Some("month"));
        assert_eq!(payment.first_name, None);
        assert_eq!(payment.intention, None);
    }
}
