//! Hardcoded content defaults
//!
//! Used whenever the CMS is unreachable, not configured, or a document is
//! absent. The site must always render something sensible: a broken CMS must
//! never take the donation flow down with it.

use super::models::{
    DonationSettings, HomepageSection, Metric, SiteSettings,
};

/// Default site settings
pub fn site_settings() -> SiteSettings {
    SiteSettings {
        site_name: "Dental Aid Network".to_string(),
        primary_donate_url: "https://app.givepay.co/donate/dental-aid-network".to_string(),
        header_cta_label: Some("Donate".to_string()),
        announcement_bar: None,
        trust_items: Some(vec![
            "UK Registered Charity No. 1190000".to_string(),
            "100% volunteer-led missions".to_string(),
            "Every £1 goes further in the field".to_string(),
        ]),
        donation_settings: Some(DonationSettings {
            donation_toolbar_enabled: Some(true),
            default_amount: Some(2500),
            suggested_amounts: Some(vec![1000, 2500, 5000, 10000]),
        }),
        footer_text: Some(
            "Dental Aid Network provides free dental care to communities without access to it."
                .to_string(),
        ),
        contact_email: Some("hello@dentalaidnetwork.org".to_string()),
        contact_phone: None,
        address: None,
    }
}

/// Default homepage section list
pub fn homepage_sections() -> Vec<HomepageSection> {
    vec![
        HomepageSection::HeroSection {
            overline: Some("Volunteer dental missions worldwide".to_string()),
            headline: Some("Bringing dental care".to_string()),
            highlighted_text: Some("where it's needed most".to_string()),
            subheadline: Some(
                "Our volunteer dentists travel to communities with no access to dental \
                 treatment. Your donation funds equipment, medicine and clinics."
                    .to_string(),
            ),
            primary_cta_label: Some("Donate now".to_string()),
            secondary_cta_label: Some("See our missions".to_string()),
            secondary_cta_link: Some("/missions".to_string()),
            trust_metrics: Some(vec![
                Metric {
                    value: Some("12,000+".to_string()),
                    label: Some("patients treated".to_string()),
                },
                Metric {
                    value: Some("40+".to_string()),
                    label: Some("missions completed".to_string()),
                },
                Metric {
                    value: Some("300+".to_string()),
                    label: Some("volunteer professionals".to_string()),
                },
            ]),
        },
        HomepageSection::TrustStripSection { enabled: Some(true) },
        HomepageSection::DonationIntentSection {
            enabled: Some(true),
            problem_overline: Some("The problem".to_string()),
            problem_statement: Some(
                "Billions of people live without access to basic dental care.".to_string(),
            ),
            narrative_text: Some(
                "Untreated dental disease causes chronic pain, infection and days of \
                 missed school and work. A single volunteer mission can change that for \
                 a whole community."
                    .to_string(),
            ),
            help_overline: Some("How you can help".to_string()),
            help_headline: Some("Choose where your donation goes".to_string()),
            general_donation_title: Some("General fund".to_string()),
            general_donation_subtitle: Some("Where it's needed most".to_string()),
            general_donation_description: Some(
                "Supports equipment, medicine and logistics across all missions.".to_string(),
            ),
            general_donation_cta_label: Some("Donate to the general fund".to_string()),
            mission_donation_title: Some("A specific mission".to_string()),
            mission_donation_subtitle: Some("Pick a project".to_string()),
            mission_donation_description: Some(
                "Fund a mission you care about and follow its progress.".to_string(),
            ),
            mission_donation_cta_label: Some("Browse missions".to_string()),
        },
        HomepageSection::FeaturedStorySection {
            enabled: Some(true),
            overline: Some("From the field".to_string()),
            custom_cta_label: None,
            read_more_label: Some("Read the full story".to_string()),
            view_all_label: Some("All stories".to_string()),
        },
        HomepageSection::LatestMissionsSection {
            enabled: Some(true),
            overline: Some("Our work".to_string()),
            headline: Some("Latest missions".to_string()),
            view_all_label: Some("All missions".to_string()),
            count: Some(3),
        },
        HomepageSection::UpcomingEventsSection {
            enabled: Some(true),
            overline: Some("Get involved".to_string()),
            headline: Some("Upcoming events".to_string()),
            view_all_label: Some("All events".to_string()),
            count: Some(3),
        },
        HomepageSection::VolunteerCtaSection {
            enabled: Some(true),
            overline: Some("Volunteer with us".to_string()),
            headline: Some("Lend your skills where they matter".to_string()),
            description: Some(
                "Dentists, hygienists, students and non-medical volunteers all make \
                 missions possible."
                    .to_string(),
            ),
            cta_label: Some("Apply to volunteer".to_string()),
            cta_link: Some("/volunteer".to_string()),
            benefits: Some(vec![
                Metric {
                    value: Some("2 weeks".to_string()),
                    label: Some("typical mission length".to_string()),
                },
                Metric {
                    value: Some("All levels".to_string()),
                    label: Some("of experience welcome".to_string()),
                },
            ]),
        },
        HomepageSection::EmailCaptureSection {
            enabled: Some(true),
            overline: Some("Stay in touch".to_string()),
            headline: Some("Hear about missions first".to_string()),
            description: Some(
                "Occasional updates on missions, events and volunteering. No spam."
                    .to_string(),
            ),
        },
        HomepageSection::FinalCtaSection {
            enabled: Some(true),
            headline: Some("Give someone".to_string()),
            highlighted_text: Some("a reason to smile".to_string()),
            description: Some(
                "Your donation buys anaesthetic, instruments and clinic time on our \
                 next mission."
                    .to_string(),
            ),
            trust_points: Some(vec![
                "Registered UK charity".to_string(),
                "Volunteer-led, low overheads".to_string(),
                "Cancel monthly gifts anytime".to_string(),
            ]),
            cta_label: Some("Donate now".to_string()),
        },
    ]
}

/// Default body paragraphs for flat pages the CMS has no document for
pub fn page_paragraphs(slug: &str) -> Vec<String> {
    match slug {
        "about" => vec![
            "Dental Aid Network is a volunteer-led charity providing free dental care \
             to communities without access to it."
                .to_string(),
            "Since our first mission we have treated thousands of patients and trained \
             local health workers to carry the work on after we leave."
                .to_string(),
        ],
        "contact" => vec![
            "We'd love to hear from you — whether you're a dental professional, a \
             potential partner, or a supporter with a question."
                .to_string(),
        ],
        "volunteer" => vec![
            "Every mission depends on volunteers: dentists, hygienists, students and \
             non-medical helpers alike."
                .to_string(),
            "Tell us a little about yourself and we'll be in touch about upcoming \
             missions."
                .to_string(),
        ],
        _ => Vec::new(),
    }
}

/// Default title for flat pages
pub fn page_title(slug: &str) -> &'static str {
    match slug {
        "about" => "About us",
        "contact" => "Contact",
        "volunteer" => "Volunteer",
        _ => "Dental Aid Network",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_donate_url_is_taggable() {
        let settings = site_settings();
        // The UTM tagger must be able to parse the fallback donate URL,
        // otherwise every fallback render produces untagged links.
        assert!(url::Url::parse(&settings.primary_donate_url).is_ok());
    }

    #[test]
    fn test_default_homepage_sections_all_enabled() {
        let sections = homepage_sections();
        assert!(!sections.is_empty());
        assert!(sections.iter().all(|s| s.is_enabled()));
    }

    #[test]
    fn test_known_flat_pages_have_fallback_copy() {
        for slug in ["about", "contact", "volunteer"] {
            assert!(!page_paragraphs(slug).is_empty(), "no fallback for {slug}");
        }
        assert!(page_paragraphs("privacy").is_empty());
    }
}
