//! Typed CMS documents
//!
//! These mirror the document schemas in the charity's Sanity studio. Every
//! field beyond title and slug is optional: editors save partial documents,
//! and the renderer tolerates whatever is missing.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A document slug
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slug {
    /// The slug value
    pub current: String,
}

/// Site-wide settings document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Public site name
    pub site_name: String,
    /// Primary donate destination for header/footer CTAs
    pub primary_donate_url: String,
    /// Header CTA label
    pub header_cta_label: Option<String>,
    /// Announcement bar shown above the header
    pub announcement_bar: Option<AnnouncementBar>,
    /// Trust strip items, e.g. registration numbers
    pub trust_items: Option<Vec<String>>,
    /// Donation widget defaults
    pub donation_settings: Option<DonationSettings>,
    /// Footer text
    pub footer_text: Option<String>,
    /// Contact email
    pub contact_email: Option<String>,
    /// Contact phone
    pub contact_phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

/// Announcement bar content
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementBar {
    /// Whether the bar is shown
    #[serde(default)]
    pub enabled: bool,
    /// Bar text
    pub text: Option<String>,
    /// Optional link label
    pub link_label: Option<String>,
    /// Optional link target
    pub link_url: Option<String>,
}

/// Donation widget defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSettings {
    /// Whether the floating donation toolbar is enabled
    pub donation_toolbar_enabled: Option<bool>,
    /// Preselected amount in minor units
    pub default_amount: Option<i64>,
    /// Suggested amounts in minor units
    pub suggested_amounts: Option<Vec<i64>>,
}

/// A supporter story
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Story title
    pub title: String,
    /// URL slug
    pub slug: Slug,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Short teaser text
    pub excerpt: Option<String>,
    /// Portable-text body; rendered as plain paragraphs
    pub body: Option<serde_json::Value>,
    /// Story-specific donate destination
    #[serde(rename = "givebriteDonateUrl")]
    pub donate_url: Option<String>,
    /// Featured on the homepage
    pub featured: Option<bool>,
}

/// Start/end of a mission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    /// Start date (ISO 8601 date)
    pub start: Option<String>,
    /// End date (ISO 8601 date)
    pub end: Option<String>,
}

/// An aid mission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Mission title
    pub title: String,
    /// URL slug
    pub slug: Slug,
    /// Mission dates
    pub date_range: Option<DateRange>,
    /// Where the mission takes place
    pub location: Option<String>,
    /// Short teaser text
    pub excerpt: Option<String>,
    /// Portable-text body
    pub body: Option<serde_json::Value>,
    /// Mission-specific donate destination
    #[serde(rename = "givebriteDonateUrl")]
    pub donate_url: Option<String>,
    /// Funding target in minor units
    pub funding_goal: Option<i64>,
    /// Funding raised so far in minor units
    pub funding_raised: Option<i64>,
    /// "upcoming" | "active" | "completed"
    pub status: Option<String>,
}

/// A fundraising or community event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Event title
    pub title: String,
    /// URL slug
    pub slug: Slug,
    /// Event start
    pub start_date: DateTime<Utc>,
    /// Event end
    pub end_date: Option<DateTime<Utc>>,
    /// Venue
    pub location: Option<String>,
    /// Short teaser text
    pub excerpt: Option<String>,
    /// Portable-text body
    pub body: Option<serde_json::Value>,
    /// External registration destination
    pub registration_url: Option<String>,
    /// Event-specific donate destination
    #[serde(rename = "givebriteDonateUrl")]
    pub donate_url: Option<String>,
    /// "fundraiser" | "volunteer" | "community" | "webinar" | "other"
    pub event_type: Option<String>,
}

/// A flat content page (about, contact, volunteer)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Page title
    pub title: String,
    /// URL slug
    pub slug: Slug,
    /// Meta description
    pub seo_description: Option<String>,
    /// Portable-text body
    pub body: Option<serde_json::Value>,
}

/// A labelled value, e.g. a trust metric ("12,000+" / "patients treated")
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metric {
    /// The value shown large
    pub value: Option<String>,
    /// The label beneath it
    pub label: Option<String>,
}

/// The homepage document: an editor-ordered list of sections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Homepage {
    /// Sections in render order
    #[serde(default)]
    pub sections: Vec<HomepageSection>,
}

/// One homepage section, discriminated by the document `_type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum HomepageSection {
    /// Large lead section with headline and CTAs
    #[serde(rename_all = "camelCase")]
    HeroSection {
        /// Small text above the headline
        overline: Option<String>,
        /// Main headline
        headline: Option<String>,
        /// Highlighted part of the headline
        highlighted_text: Option<String>,
        /// Supporting copy under the headline
        subheadline: Option<String>,
        /// Primary CTA label
        primary_cta_label: Option<String>,
        /// Secondary CTA label
        secondary_cta_label: Option<String>,
        /// Secondary CTA target
        secondary_cta_link: Option<String>,
        /// Headline trust metrics
        trust_metrics: Option<Vec<Metric>>,
    },
    /// Row of trust items from site settings
    #[serde(rename_all = "camelCase")]
    TrustStripSection {
        /// Whether the section renders
        enabled: Option<bool>,
    },
    /// Problem statement plus general/mission donation cards
    #[serde(rename_all = "camelCase")]
    DonationIntentSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the problem statement
        problem_overline: Option<String>,
        /// The problem statement headline
        problem_statement: Option<String>,
        /// Narrative paragraph
        narrative_text: Option<String>,
        /// Small text above the help headline
        help_overline: Option<String>,
        /// "How you can help" headline
        help_headline: Option<String>,
        /// General donation card title
        general_donation_title: Option<String>,
        /// General donation card subtitle
        general_donation_subtitle: Option<String>,
        /// General donation card description
        general_donation_description: Option<String>,
        /// General donation CTA label
        general_donation_cta_label: Option<String>,
        /// Mission donation card title
        mission_donation_title: Option<String>,
        /// Mission donation card subtitle
        mission_donation_subtitle: Option<String>,
        /// Mission donation card description
        mission_donation_description: Option<String>,
        /// Mission donation CTA label
        mission_donation_cta_label: Option<String>,
    },
    /// The featured story teaser
    #[serde(rename_all = "camelCase")]
    FeaturedStorySection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the story
        overline: Option<String>,
        /// Custom donate CTA label
        custom_cta_label: Option<String>,
        /// "Read more" label
        read_more_label: Option<String>,
        /// "View all" label
        view_all_label: Option<String>,
    },
    /// Teasers for the most recent missions
    #[serde(rename_all = "camelCase")]
    LatestMissionsSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the headline
        overline: Option<String>,
        /// Section headline
        headline: Option<String>,
        /// "View all" label
        view_all_label: Option<String>,
        /// How many missions to show
        count: Option<usize>,
    },
    /// Teasers for upcoming events
    #[serde(rename_all = "camelCase")]
    UpcomingEventsSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the headline
        overline: Option<String>,
        /// Section headline
        headline: Option<String>,
        /// "View all" label
        view_all_label: Option<String>,
        /// How many events to show
        count: Option<usize>,
    },
    /// Volunteer recruitment CTA
    #[serde(rename_all = "camelCase")]
    VolunteerCtaSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the headline
        overline: Option<String>,
        /// Section headline
        headline: Option<String>,
        /// Supporting copy
        description: Option<String>,
        /// CTA label
        cta_label: Option<String>,
        /// CTA target
        cta_link: Option<String>,
        /// Benefit metrics
        benefits: Option<Vec<Metric>>,
    },
    /// Closing donate CTA
    #[serde(rename_all = "camelCase")]
    FinalCtaSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Section headline
        headline: Option<String>,
        /// Highlighted part of the headline
        highlighted_text: Option<String>,
        /// Supporting copy
        description: Option<String>,
        /// Trust bullet points
        trust_points: Option<Vec<String>>,
        /// CTA label
        cta_label: Option<String>,
    },
    /// Email signup section
    #[serde(rename_all = "camelCase")]
    EmailCaptureSection {
        /// Whether the section renders
        enabled: Option<bool>,
        /// Small text above the headline
        overline: Option<String>,
        /// Section headline
        headline: Option<String>,
        /// Supporting copy
        description: Option<String>,
    },
    /// A section type this build does not know; skipped by the renderer
    #[serde(other)]
    Unknown,
}

impl HomepageSection {
    /// Whether the section should render. Sections default to enabled; the
    /// hero has no toggle.
    pub fn is_enabled(&self) -> bool {
        match self {
            HomepageSection::HeroSection { .. } => true,
            HomepageSection::TrustStripSection { enabled, .. }
            | HomepageSection::DonationIntentSection { enabled, .. }
            | HomepageSection::FeaturedStorySection { enabled, .. }
            | HomepageSection::LatestMissionsSection { enabled, .. }
            | HomepageSection::UpcomingEventsSection { enabled, .. }
            | HomepageSection::VolunteerCtaSection { enabled, .. }
            | HomepageSection::FinalCtaSection { enabled, .. }
            | HomepageSection::EmailCaptureSection { enabled, .. } => enabled.unwrap_or(true),
            HomepageSection::Unknown => false,
        }
    }
}

/// Pull the plain text out of a portable-text body: every `text` field of
/// every child of every block, grouped per block. Marks, links and custom
/// blocks are flattened away.
pub fn portable_text_paragraphs(body: &serde_json::Value) -> Vec<String> {
    let Some(blocks) = body.as_array() else {
        return Vec::new();
    };

    blocks
        .iter()
        .filter_map(|block| {
            let children = block.get("children")?.as_array()?;
            let text: String = children
                .iter()
                .filter_map(|child| child.get("text")?.as_str())
                .collect();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homepage_sections_deserialize_by_type_tag() {
        let raw = serde_json::json!({
            "sections": [
                {
                    "_type": "heroSection",
                    "_key": "a1",
                    "headline": "Bringing dental care",
                    "highlightedText": "where it's needed most",
                    "trustMetrics": [{ "value": "12,000+", "label": "patients treated" }]
                },
                { "_type": "trustStripSection", "_key": "a2", "enabled": false },
                { "_type": "somethingNewer", "_key": "a3" }
            ]
        });

        let homepage: Homepage = serde_json::from_value(raw).unwrap();
        assert_eq!(homepage.sections.len(), 3);

        match &homepage.sections[0] {
            HomepageSection::HeroSection {
                headline,
                trust_metrics,
                ..
            } => {
                assert_eq!(headline.as_deref(), Some("Bringing dental care"));
                assert_eq!(
                    trust_metrics.as_ref().unwrap()[0].value.as_deref(),
                    Some("12,000+")
                );
            }
            other => panic!("expected hero, got {:?}", other),
        }

        assert!(homepage.sections[0].is_enabled());
        assert!(!homepage.sections[1].is_enabled());
        assert!(matches!(homepage.sections[2], HomepageSection::Unknown));
        assert!(!homepage.sections[2].is_enabled());
    }

    #[test]
    fn test_mission_deserializes_from_query_shape() {
        let raw = serde_json::json!({
            "_id": "m1",
            "title": "Guatemala 2024",
            "slug": { "current": "guatemala-2024" },
            "dateRange": { "start": "2024-03-02", "end": "2024-03-16" },
            "location": "Huehuetenango, Guatemala",
            "excerpt": "Two weeks of clinics in the western highlands.",
            "givebriteDonateUrl": "https://pay.example/guatemala",
            "fundingGoal": 1200000,
            "fundingRaised": 450000,
            "status": "active"
        });

        let mission: Mission = serde_json::from_value(raw).unwrap();
        assert_eq!(mission.slug.current, "guatemala-2024");
        assert_eq!(mission.donate_url.as_deref(), Some("https://pay.example/guatemala"));
        assert_eq!(mission.funding_goal, Some(1_200_000));
        assert_eq!(mission.date_range.unwrap().start.as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn test_portable_text_paragraphs() {
        let body = serde_json::json!([
            {
                "_type": "block",
                "children": [
                    { "_type": "span", "text": "Hello " },
                    { "_type": "span", "text": "world." }
                ]
            },
            { "_type": "block", "children": [] },
            { "_type": "image", "asset": { "_ref": "image-abc" } }
        ]);

        assert_eq!(portable_text_paragraphs(&body), vec!["Hello world."]);
        assert!(portable_text_paragraphs(&serde_json::Value::Null).is_empty());
    }
}
