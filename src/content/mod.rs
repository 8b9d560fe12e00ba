//! Content module: typed documents from the headless CMS
//!
//! This module handles read-only content for the site:
//! - A small client for the Sanity query API (fixed GROQ strings, no query
//!   building)
//! - Typed document models for stories, missions, events, pages, site
//!   settings and homepage sections
//! - Hardcoded fallbacks so every page still renders when the CMS is
//!   unreachable, not configured, or missing a document

use crate::{config::ContentConfig, SiteError, SiteResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

pub mod fallback;
mod models;

pub use models::*;

const SITE_SETTINGS_QUERY: &str = r#"*[_type == "siteSettings"][0]{siteName, primaryDonateUrl, headerCtaLabel, announcementBar, trustItems, donationSettings, footerText, contactEmail, contactPhone, address}"#;

const HOMEPAGE_QUERY: &str = r#"*[_type == "homepage"][0]{sections}"#;

const FEATURED_STORY_QUERY: &str = r#"*[_type == "story" && featured == true][0]{_id, title, slug, publishedAt, excerpt, body, givebriteDonateUrl, featured}"#;

const ALL_STORIES_QUERY: &str = r#"*[_type == "story"] | order(publishedAt desc){_id, title, slug, publishedAt, excerpt, featured}"#;

const STORY_BY_SLUG_QUERY: &str = r#"*[_type == "story" && slug.current == $slug][0]{_id, title, slug, publishedAt, excerpt, body, givebriteDonateUrl, featured}"#;

const LATEST_MISSIONS_QUERY: &str = r#"*[_type == "mission"] | order(dateRange.start desc)[0...3]{_id, title, slug, dateRange, location, excerpt, status, givebriteDonateUrl}"#;

const ALL_MISSIONS_QUERY: &str = r#"*[_type == "mission"] | order(dateRange.start desc){_id, title, slug, dateRange, location, excerpt, status, fundingGoal, fundingRaised}"#;

const MISSION_BY_SLUG_QUERY: &str = r#"*[_type == "mission" && slug.current == $slug][0]{_id, title, slug, dateRange, location, excerpt, body, givebriteDonateUrl, fundingGoal, fundingRaised, status}"#;

const UPCOMING_EVENTS_QUERY: &str = r#"*[_type == "event" && startDate >= now()] | order(startDate asc)[0...3]{_id, title, slug, startDate, endDate, location, excerpt, eventType, registrationUrl}"#;

const ALL_EVENTS_QUERY: &str = r#"*[_type == "event"] | order(startDate desc){_id, title, slug, startDate, endDate, location, excerpt, eventType, registrationUrl}"#;

const EVENT_BY_SLUG_QUERY: &str = r#"*[_type == "event" && slug.current == $slug][0]{_id, title, slug, startDate, endDate, location, excerpt, body, registrationUrl, givebriteDonateUrl, eventType}"#;

const PAGE_BY_SLUG_QUERY: &str = r#"*[_type == "page" && slug.current == $slug][0]{_id, title, slug, seoDescription, body}"#;

/// Envelope around every Sanity query response
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// HTTP client for the Sanity query API (CDN endpoint)
pub struct SanityClient {
    http: reqwest::Client,
    project_id: Option<String>,
    dataset: String,
    api_version: String,
}

impl SanityClient {
    /// Create a new Sanity client
    pub fn new(http: reqwest::Client, config: &ContentConfig) -> Self {
        Self {
            http,
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// A project id is configured
    pub fn is_configured(&self) -> bool {
        self.project_id.is_some()
    }

    /// Run a GROQ query, returning the (possibly null) result
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        slug: Option<&str>,
    ) -> SiteResult<Option<T>> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| SiteError::Content("CMS not configured".to_string()))?;

        let url = format!(
            "https://{}.apicdn.sanity.io/v{}/data/query/{}",
            project_id, self.api_version, self.dataset
        );

        let mut request = self.http.get(&url).query(&[("query", groq)]);
        if let Some(slug) = slug {
            // Sanity parameters are JSON-encoded values, so a slug string
            // must arrive quoted
            let encoded =
                serde_json::to_string(slug).unwrap_or_else(|_| format!("\"{}\"", slug));
            request = request.query(&[("$slug", encoded.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SiteError::Content(format!("CMS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::Content(format!(
                "CMS returned status {}",
                status
            )));
        }

        let envelope: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| SiteError::Content(format!("CMS response parse failed: {}", e)))?;

        Ok(envelope.result)
    }
}

/// Content store: typed fetches with hardcoded fallbacks.
///
/// Document absence is not an error; slug lookups return `None` and the
/// aggregate fetches return defaults.
pub struct ContentStore {
    client: SanityClient,
}

impl ContentStore {
    /// Create a new content store
    pub fn new(http: reqwest::Client, config: &ContentConfig) -> Self {
        Self {
            client: SanityClient::new(http, config),
        }
    }

    /// The CMS is configured
    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Run a query whose absence or failure degrades to a fallback value
    async fn fetch_or<T: DeserializeOwned>(
        &self,
        groq: &str,
        slug: Option<&str>,
        what: &str,
        fallback: impl FnOnce() -> T,
    ) -> T {
        if !self.client.is_configured() {
            debug!("CMS not configured; using default {}", what);
            return fallback();
        }

        match self.client.query(groq, slug).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("No {} document in CMS; using default", what);
                fallback()
            }
            Err(e) => {
                warn!("Falling back to default {}: {}", what, e);
                fallback()
            }
        }
    }

    /// Run a slug lookup; absence and failure both yield `None`
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        groq: &str,
        slug: &str,
        what: &str,
    ) -> Option<T> {
        if !self.client.is_configured() {
            return None;
        }

        match self.client.query(groq, Some(slug)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to fetch {} '{}': {}", what, slug, e);
                None
            }
        }
    }

    /// Site-wide settings, defaulting to the hardcoded charity settings
    pub async fn site_settings(&self) -> SiteSettings {
        self.fetch_or(SITE_SETTINGS_QUERY, None, "site settings", fallback::site_settings)
            .await
    }

    /// Homepage sections in render order, defaulting to the standard layout
    pub async fn homepage_sections(&self) -> Vec<HomepageSection> {
        let sections: Vec<HomepageSection> = self
            .fetch_or::<Homepage>(HOMEPAGE_QUERY, None, "homepage", Homepage::default)
            .await
            .sections
            .into_iter()
            .filter(|section| !matches!(section, HomepageSection::Unknown))
            .collect();

        // An absent or empty homepage document means the editors have not
        // curated one yet; render the standard layout instead
        if sections.is_empty() {
            fallback::homepage_sections()
        } else {
            sections
        }
    }

    /// The story flagged as featured, if any
    pub async fn featured_story(&self) -> Option<Story> {
        if !self.client.is_configured() {
            return None;
        }
        match self.client.query(FEATURED_STORY_QUERY, None).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to fetch featured story: {}", e);
                None
            }
        }
    }

    /// All stories, newest first
    pub async fn stories(&self) -> Vec<Story> {
        self.fetch_or(ALL_STORIES_QUERY, None, "stories", Vec::new)
            .await
    }

    /// One story by slug
    pub async fn story(&self, slug: &str) -> Option<Story> {
        self.fetch_optional(STORY_BY_SLUG_QUERY, slug, "story").await
    }

    /// The most recent missions (up to three)
    pub async fn latest_missions(&self) -> Vec<Mission> {
        self.fetch_or(LATEST_MISSIONS_QUERY, None, "latest missions", Vec::new)
            .await
    }

    /// All missions, newest first
    pub async fn missions(&self) -> Vec<Mission> {
        self.fetch_or(ALL_MISSIONS_QUERY, None, "missions", Vec::new)
            .await
    }

    /// One mission by slug
    pub async fn mission(&self, slug: &str) -> Option<Mission> {
        self.fetch_optional(MISSION_BY_SLUG_QUERY, slug, "mission")
            .await
    }

    /// The next upcoming events (up to three)
    pub async fn upcoming_events(&self) -> Vec<Event> {
        self.fetch_or(UPCOMING_EVENTS_QUERY, None, "upcoming events", Vec::new)
            .await
    }

    /// All events, newest first
    pub async fn events(&self) -> Vec<Event> {
        self.fetch_or(ALL_EVENTS_QUERY, None, "events", Vec::new)
            .await
    }

    /// One event by slug
    pub async fn event(&self, slug: &str) -> Option<Event> {
        self.fetch_optional(EVENT_BY_SLUG_QUERY, slug, "event").await
    }

    /// One flat page by slug
    pub async fn page(&self, slug: &str) -> Option<Page> {
        self.fetch_optional(PAGE_BY_SLUG_QUERY, slug, "page").await
    }
}
