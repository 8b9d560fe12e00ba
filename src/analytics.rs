//! Fire-and-forget analytics capture (PostHog-compatible)
//!
//! Events are posted from a spawned task; the request path never waits for
//! the sink and a capture failure is never surfaced to the user. With no API
//! key configured, capture is a no-op.

use crate::config::AnalyticsConfig;
use tracing::debug;

/// Analytics capture client
pub struct Analytics {
    http: reqwest::Client,
    host: String,
    api_key: Option<String>,
}

/// Assemble the capture request body
fn capture_body(
    api_key: &str,
    event: &str,
    distinct_id: &str,
    properties: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "api_key": api_key,
        "event": event,
        "distinct_id": distinct_id,
        "properties": properties,
    })
}

impl Analytics {
    /// Create a new analytics client
    pub fn new(http: reqwest::Client, config: &AnalyticsConfig) -> Self {
        Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Capture an event without awaiting the sink
    pub fn capture(&self, event: &str, properties: serde_json::Value) {
        let Some(api_key) = &self.api_key else {
            debug!("Analytics not configured; dropping event {}", event);
            return;
        };

        let body = capture_body(api_key, event, "site-server", properties);
        let url = format!("{}/capture/", self.host);
        let http = self.http.clone();
        let event = event.to_string();

        tokio::spawn(async move {
            if let Err(e) = http.post(&url).json(&body).send().await {
                debug!("Analytics capture failed for {}: {}", event, e);
            }
        });
    }

    /// Capture a server-side page view
    pub fn page_view(&self, path: &str, referrer: Option<&str>) {
        self.capture(
            "page_view",
            serde_json::json!({
                "path": path,
                "referrer": referrer,
            }),
        );
    }

    /// Capture a signup form submission
    pub fn email_signup(&self, status: &str, error_message: Option<&str>) {
        self.capture(
            "email_signup_submitted",
            serde_json::json!({
                "status": status,
                "error_message": error_message,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_body_shape() {
        let body = capture_body(
            "phc_key",
            "page_view",
            "site-server",
            serde_json::json!({ "path": "/missions" }),
        );

        assert_eq!(body["api_key"], "phc_key");
        assert_eq!(body["event"], "page_view");
        assert_eq!(body["distinct_id"], "site-server");
        assert_eq!(body["properties"]["path"], "/missions");
    }

    #[test]
    fn test_unconfigured_capture_is_a_noop() {
        // No tokio runtime here: capture must return before spawning
        let analytics = Analytics::new(reqwest::Client::new(), &AnalyticsConfig::default());
        analytics.capture("page_view", serde_json::json!({}));
    }
}
