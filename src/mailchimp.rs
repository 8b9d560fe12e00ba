//! Mailchimp list API integration
//!
//! Validating proxy in front of the Mailchimp members endpoint. Signups are
//! submitted as single opt-in ("subscribed") upserts; the provider's "Member
//! Exists" rejection is normalized into a user-facing success because the
//! desired end state (being subscribed) is already achieved.
//!
//! When credentials are absent the gateway simulates success in development
//! so the site can be worked on without a live audience, and fails with a
//! generic configuration error anywhere else.

use crate::{config::MailchimpConfig, SiteError, SiteResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

/// An email signup as submitted by the browser.
///
/// Volunteer applications arrive through the same shape, with
/// `tags: ["volunteer", <profession>]` and PHONE/PROFESSION/MESSAGE merge
/// fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    /// Subscriber email address
    #[serde(default)]
    pub email: String,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Audience tags, e.g. ["volunteer", "dentist"]
    pub tags: Option<Vec<String>>,
    /// Additional provider merge fields
    pub merge_fields: Option<BTreeMap<String, String>>,
}

impl SubscribeRequest {
    /// Validate the request before any network call
    pub fn validate(&self) -> SiteResult<()> {
        if !self.email.contains('@') {
            return Err(SiteError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }
        Ok(())
    }
}

/// The member upsert sent to the Mailchimp API
#[derive(Debug, Clone, Serialize)]
pub struct MemberPayload {
    /// Subscriber email, lowercased
    pub email_address: String,
    /// Always "subscribed" (single opt-in, not double opt-in pending)
    pub status: String,
    /// FNAME/LNAME plus any caller-supplied merge fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_fields: Option<BTreeMap<String, String>>,
    /// Audience tags, only when non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Build the provider member payload from a validated signup request.
///
/// Merge fields are attached only when any are supplied; caller-supplied
/// merge fields win over FNAME/LNAME on key collision. Tags are attached only
/// when non-empty.
pub fn build_member_payload(req: &SubscribeRequest) -> MemberPayload {
    let has_merge_input =
        req.first_name.is_some() || req.last_name.is_some() || req.merge_fields.is_some();

    let merge_fields = if has_merge_input {
        let mut fields = BTreeMap::new();
        if let Some(first) = &req.first_name {
            fields.insert("FNAME".to_string(), first.clone());
        }
        if let Some(last) = &req.last_name {
            fields.insert("LNAME".to_string(), last.clone());
        }
        if let Some(extra) = &req.merge_fields {
            fields.extend(extra.clone());
        }
        Some(fields)
    } else {
        None
    };

    let tags = req.tags.clone().filter(|tags| !tags.is_empty());

    MemberPayload {
        email_address: req.email.to_lowercase(),
        status: "subscribed".to_string(),
        merge_fields,
        tags,
    }
}

/// Outcome of a subscription upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// New member added to the audience
    Subscribed,
    /// Member already existed; treated as success
    AlreadySubscribed,
    /// Credentials absent in development; nothing was sent
    Simulated,
}

impl SubscribeOutcome {
    /// The message shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Subscribed => "Successfully subscribed!",
            SubscribeOutcome::AlreadySubscribed => "You're already subscribed!",
            SubscribeOutcome::Simulated => "Subscription simulated (Mailchimp not configured)",
        }
    }
}

/// Mailing-list provider interface.
///
/// One concrete adapter talks to Mailchimp; tests substitute a counting fake.
#[async_trait]
pub trait MailingListProvider: Send + Sync {
    /// Upsert a member into the audience
    async fn upsert_member(&self, payload: &MemberPayload) -> SiteResult<SubscribeOutcome>;
}

/// Error body returned by the Mailchimp API
#[derive(Debug, Deserialize)]
struct MailchimpError {
    title: Option<String>,
}

/// Normalize a non-success provider response into an outcome or error.
///
/// "Member Exists" is a user-facing success; "Invalid Resource" maps to the
/// same invalid-email error as local validation; anything else propagates the
/// provider's HTTP status with a generic message.
fn normalize_error_response(
    status: u16,
    data: &serde_json::Value,
) -> SiteResult<SubscribeOutcome> {
    let parsed: MailchimpError =
        serde_json::from_value(data.clone()).unwrap_or(MailchimpError { title: None });

    match parsed.title.as_deref() {
        Some("Member Exists") => Ok(SubscribeOutcome::AlreadySubscribed),
        Some("Invalid Resource") => Err(SiteError::Validation(
            "Please provide a valid email address".to_string(),
        )),
        _ => {
            error!("Mailchimp error: {}", data);
            Err(SiteError::Provider {
                status,
                message: "Failed to subscribe. Please try again.".to_string(),
            })
        }
    }
}

/// HTTP client for the Mailchimp API
pub struct MailchimpClient {
    http: reqwest::Client,
    config: MailchimpConfig,
    development: bool,
}

impl MailchimpClient {
    /// Create a new Mailchimp client
    pub fn new(http: reqwest::Client, config: &MailchimpConfig, development: bool) -> Self {
        Self {
            http,
            config: config.clone(),
            development,
        }
    }
}

#[async_trait]
impl MailingListProvider for MailchimpClient {
    async fn upsert_member(&self, payload: &MemberPayload) -> SiteResult<SubscribeOutcome> {
        if !self.config.is_configured() {
            if self.development {
                info!(
                    "Mailchimp not configured. Would subscribe: {}",
                    serde_json::to_string(payload).unwrap_or_default()
                );
                return Ok(SubscribeOutcome::Simulated);
            }
            error!("Mailchimp credentials not configured");
            return Err(SiteError::Config("Email service not configured".to_string()));
        }

        // is_configured() guarantees all three are present
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let audience_id = self.config.audience_id.as_deref().unwrap_or_default();
        let server_prefix = self.config.server_prefix.as_deref().unwrap_or_default();

        let url = format!(
            "https://{}.api.mailchimp.com/3.0/lists/{}/members",
            server_prefix, audience_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Mailchimp request failed: {}", e);
                SiteError::Unexpected(format!("Mailchimp request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read Mailchimp response: {}", e);
            SiteError::Unexpected(format!("Failed to read Mailchimp response: {}", e))
        })?;

        let data: serde_json::Value = serde_json::from_str(&body).map_err(|_| {
            error!("Failed to parse Mailchimp response: {}", body);
            SiteError::ProviderResponse("Failed to subscribe. Please try again.".to_string())
        })?;

        if !status.is_success() {
            return normalize_error_response(status.as_u16(), &data);
        }

        Ok(SubscribeOutcome::Subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_at_sign() {
        let mut req = SubscribeRequest::default();
        assert!(req.validate().is_err());

        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        req.email = "jo@example.org".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_member_payload_minimal() {
        let req = SubscribeRequest {
            email: "Jo@Example.ORG".to_string(),
            ..Default::default()
        };

        let payload = build_member_payload(&req);
        assert_eq!(payload.email_address, "jo@example.org");
        assert_eq!(payload.status, "subscribed");
        assert!(payload.merge_fields.is_none());
        assert!(payload.tags.is_none());

        // Absent optionals must not appear as nulls on the wire
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("merge_fields").is_none());
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_member_payload_names_and_extra_merge_fields() {
        let mut extra = BTreeMap::new();
        extra.insert("PHONE".to_string(), "07700 900000".to_string());

        let req = SubscribeRequest {
            email: "jo@example.org".to_string(),
            first_name: Some("Jo".to_string()),
            last_name: Some("Bloggs".to_string()),
            merge_fields: Some(extra),
            ..Default::default()
        };

        let fields = build_member_payload(&req).merge_fields.unwrap();
        assert_eq!(fields.get("FNAME").map(String::as_str), Some("Jo"));
        assert_eq!(fields.get("LNAME").map(String::as_str), Some("Bloggs"));
        assert_eq!(fields.get("PHONE").map(String::as_str), Some("07700 900000"));
    }

    #[test]
    fn test_member_payload_drops_empty_tags() {
        let mut req = SubscribeRequest {
            email: "jo@example.org".to_string(),
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(build_member_payload(&req).tags.is_none());

        req.tags = Some(vec!["volunteer".to_string(), "dentist".to_string()]);
        assert_eq!(
            build_member_payload(&req).tags,
            Some(vec!["volunteer".to_string(), "dentist".to_string()])
        );
    }

    #[test]
    fn test_member_exists_is_success() {
        let data = serde_json::json!({ "title": "Member Exists", "status": 400 });
        let outcome = normalize_error_response(400, &data).unwrap();
        assert_eq!(outcome, SubscribeOutcome::AlreadySubscribed);
        assert_eq!(outcome.user_message(), "You're already subscribed!");
    }

    #[test]
    fn test_invalid_resource_maps_to_invalid_email() {
        let data = serde_json::json!({ "title": "Invalid Resource" });
        let err = normalize_error_response(400, &data).unwrap_err();
        assert!(matches!(err, SiteError::Validation(_)));
    }

    #[test]
    fn test_other_errors_propagate_provider_status() {
        let data = serde_json::json!({ "title": "Forgotten Email Not Subscribed" });
        let err = normalize_error_response(403, &data).unwrap_err();
        match err {
            SiteError::Provider { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Failed to subscribe. Please try again.");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
