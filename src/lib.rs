//! dentalaid-site: the web server behind the Dental Aid Network site
//!
//! This crate serves the charity's marketing and donation website:
//!
//! - **Content pages**: stories, missions, events, flat pages and the homepage
//!   are fetched from a hosted headless CMS and rendered server-side, with
//!   hardcoded fallbacks when the CMS is unreachable or a document is missing
//! - **Donation checkout**: a thin validating proxy in front of the GivePay
//!   payment API (checkout creation and sanitized session lookup)
//! - **Email signups**: a validating proxy in front of the Mailchimp list API,
//!   also used for volunteer applications
//! - **Attribution**: UTM tagging of outbound donate links and fire-and-forget
//!   analytics capture
//!
//! # Architecture
//!
//! The server holds no state of its own. Each request independently validates
//! its input, performs at most one outbound call to a single external API, and
//! returns; the payment provider owns the checkout-session record and this
//! system only ever reads it.
//!
#![warn(missing_docs)]

pub mod analytics;
pub mod api;
pub mod config;
pub mod content;
pub mod givepay;
pub mod mailchimp;
pub mod pages;
pub mod utm;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub use config::Config;

use analytics::Analytics;
use content::ContentStore;
use givepay::{GivePayClient, PaymentProvider};
use mailchimp::{MailchimpClient, MailingListProvider};

/// The main site application state, shared across all request handlers
#[derive(Clone)]
pub struct SiteApp {
    /// Application configuration
    pub config: Arc<Config>,
    /// Payment provider (GivePay)
    pub payments: Arc<dyn PaymentProvider>,
    /// Mailing-list provider (Mailchimp)
    pub mailing: Arc<dyn MailingListProvider>,
    /// Content store backed by the CMS, with hardcoded fallbacks
    pub content: Arc<ContentStore>,
    /// Fire-and-forget analytics capture
    pub analytics: Arc<Analytics>,
}

impl SiteApp {
    /// Create a new site application instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing dentalaid-site application...");

        let config = Arc::new(config);

        // One shared HTTP client for all outbound provider calls
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.server.outbound_timeout_seconds,
            ))
            .build()?;

        let payments: Arc<dyn PaymentProvider> = Arc::new(GivePayClient::new(
            http.clone(),
            &config.givepay,
            config.is_development(),
        ));
        let mailing: Arc<dyn MailingListProvider> = Arc::new(MailchimpClient::new(
            http.clone(),
            &config.mailchimp,
            config.is_development(),
        ));
        let content = Arc::new(ContentStore::new(http.clone(), &config.content));
        let analytics = Arc::new(Analytics::new(http, &config.analytics));

        info!("dentalaid-site application initialized");

        Ok(Self {
            config,
            payments,
            mailing,
            content,
            analytics,
        })
    }

    /// Start the site application
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(tokio::sync::oneshot::channel().1)
            .await
    }

    /// Start the site application with a shutdown signal
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) -> Result<()> {
        info!(
            "Starting dentalaid-site. Listening on http://{}",
            self.config.server.bind_address
        );
        api::serve_with_shutdown(self.clone(), shutdown_rx).await
    }
}

/// Error types for the site application
#[derive(thiserror::Error, Debug)]
pub enum SiteError {
    /// Invalid caller input; the message is shown to the user as-is
    #[error("{0}")]
    Validation(String),

    /// A required provider credential is missing. The message is the generic
    /// text shown to the caller; specifics are logged where the error is
    /// raised and never echoed in the response.
    #[error("{0}")]
    Config(String),

    /// Non-success response from an external provider, carrying the
    /// provider's HTTP status and a message safe to show to the caller
    #[error("{message}")]
    Provider {
        /// HTTP status returned by the provider
        status: u16,
        /// User-facing message (the provider's own when safe, else generic)
        message: String,
    },

    /// Unparseable response body from an external provider. The raw body is
    /// logged where the error is raised; the message here is the generic text
    /// shown to the caller.
    #[error("{0}")]
    ProviderResponse(String),

    /// Content fetch failure; pages fall back to defaults instead of failing
    #[error("Content error: {0}")]
    Content(String),

    /// Any other failure, caught at the handler boundary
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type alias for site operations
pub type SiteResult<T> = std::result::Result<T, SiteError>;
