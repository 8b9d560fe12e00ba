//! Configuration management for dentalaid-site
//!
//! Configuration is loaded from TOML files, with provider credentials
//! overridable through environment variables so secrets never need to live
//! on disk.
//!
//! # Example Configuration File
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0:8080"
//!
//! [site]
//! base_url = "https://www.dentalaidnetwork.org"
//! environment = "production"
//!
//! [givepay]
//! api_url = "https://api.givepay.co"
//! currency = "GBP"
//!
//! [mailchimp]
//! audience_id = "abc123"
//! server_prefix = "us21"
//!
//! [content]
//! project_id = "k8s3x1pz"
//! dataset = "production"
//! ```

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Site identity and environment
    #[serde(default)]
    pub site: SiteConfig,

    /// GivePay payment API configuration
    #[serde(default)]
    pub givepay: GivePayConfig,

    /// Mailchimp list API configuration
    #[serde(default)]
    pub mailchimp: MailchimpConfig,

    /// Headless CMS (Sanity) configuration
    #[serde(default)]
    pub content: ContentConfig,

    /// Analytics capture configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Enable CORS for the JSON API
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Timeout for outbound provider calls, in seconds
    #[serde(default = "default_outbound_timeout")]
    pub outbound_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            enable_cors: true,
            outbound_timeout_seconds: default_outbound_timeout(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_outbound_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

/// Site identity and environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public site name
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Public base URL of the deployed site. The payment provider only
    /// accepts HTTPS redirect targets, so checkout omits the return URL
    /// unless this is an https:// URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deployment environment ("development" or "production")
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
            environment: default_environment(),
        }
    }
}

fn default_site_name() -> String {
    "Dental Aid Network".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// GivePay payment API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GivePayConfig {
    /// Base URL of the GivePay API
    #[serde(default = "default_givepay_api_url")]
    pub api_url: String,

    /// GivePay API key. Checkout and session lookups fail with a generic
    /// "not configured" error when absent.
    pub api_key: Option<String>,

    /// Donation currency (ISO 4217)
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for GivePayConfig {
    fn default() -> Self {
        Self {
            api_url: default_givepay_api_url(),
            api_key: None,
            currency: default_currency(),
        }
    }
}

fn default_givepay_api_url() -> String {
    "https://api.givepay.co".to_string()
}

fn default_currency() -> String {
    "GBP".to_string()
}

/// Mailchimp list API configuration
///
/// All three values are required for live subscriptions. When any is absent
/// the gateway simulates success in development and fails in production.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailchimpConfig {
    /// Mailchimp API key
    pub api_key: Option<String>,

    /// Audience (list) identifier
    pub audience_id: Option<String>,

    /// Server prefix, e.g. "us21" (the datacenter part of the API hostname)
    pub server_prefix: Option<String>,
}

impl MailchimpConfig {
    /// All three credentials present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.audience_id.is_some() && self.server_prefix.is_some()
    }
}

/// Headless CMS (Sanity) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Sanity project identifier. When absent the CMS is considered not
    /// configured and every page renders from hardcoded defaults.
    pub project_id: Option<String>,

    /// Dataset name
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Sanity API version date
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: default_dataset(),
            api_version: default_api_version(),
        }
    }
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2024-01-01".to_string()
}

/// Analytics capture configuration (PostHog-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Capture host
    #[serde(default = "default_analytics_host")]
    pub host: String,

    /// Project API key. Capture is a no-op when absent.
    pub api_key: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            host: default_analytics_host(),
            api_key: None,
        }
    }
}

fn default_analytics_host() -> String {
    "https://app.posthog.com".to_string()
}

impl Config {
    /// Apply environment-variable overrides for provider credentials.
    ///
    /// Secrets are typically injected through the environment rather than
    /// written into the TOML file; a variable that is set always wins.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GIVEPAY_API_KEY") {
            self.givepay.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("MAILCHIMP_API_KEY") {
            self.mailchimp.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("MAILCHIMP_AUDIENCE_ID") {
            self.mailchimp.audience_id = Some(v);
        }
        if let Ok(v) = std::env::var("MAILCHIMP_SERVER_PREFIX") {
            self.mailchimp.server_prefix = Some(v);
        }
        if let Ok(v) = std::env::var("SANITY_PROJECT_ID") {
            self.content.project_id = Some(v);
        }
        if let Ok(v) = std::env::var("POSTHOG_API_KEY") {
            self.analytics.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("SITE_BASE_URL") {
            self.site.base_url = v;
        }
    }

    /// True when running in the development environment
    pub fn is_development(&self) -> bool {
        self.site.environment == "development"
    }

    /// The public base URL, but only when it is HTTPS. Used for the checkout
    /// return URL, which the payment provider rejects over plain HTTP.
    pub fn https_base_url(&self) -> Option<&str> {
        let url = self.site.base_url.trim_end_matches('/');
        if url.starts_with("https://") {
            Some(url)
        } else {
            None
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let valid_environments = ["development", "production"];
        if !valid_environments.contains(&self.site.environment.as_str()) {
            return Err(format!(
                "Invalid environment: {}. Must be one of: {:?}",
                self.site.environment, valid_environments
            ));
        }

        if self.site.base_url.is_empty() {
            return Err("Site base URL cannot be empty".to_string());
        }

        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                self.server.bind_address
            ));
        }

        if self.givepay.currency.len() != 3 {
            return Err(format!(
                "Invalid currency code: {}",
                self.givepay.currency
            ));
        }

        Ok(())
    }
}
