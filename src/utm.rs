//! UTM campaign tagging for outbound links
//!
//! Pure, synchronous, no I/O. Donate and registration links leave the site
//! for third-party pages; tagging them lets the charity attribute traffic to
//! the page it came from. A malformed URL is returned unchanged: broken
//! tagging must never block the user's donation flow.

use url::Url;

/// Fixed utm_source value for all outbound links
pub const UTM_SOURCE: &str = "dentalaidnetwork";

/// Fixed utm_medium value for all outbound links
pub const UTM_MEDIUM: &str = "website";

/// Campaign attribution derived from the current page; never stored
#[derive(Debug, Clone, Default)]
pub struct CampaignContext {
    /// Campaign label (defaults to "general" when absent)
    pub campaign: Option<String>,
    /// Optional content value, e.g. a story or mission slug
    pub content: Option<String>,
}

/// Append UTM parameters to a destination URL.
///
/// Parameters are set, not appended: repeated calls on the function's own
/// output do not duplicate keys. Unrelated existing query parameters are
/// preserved. An unparseable URL is returned unchanged.
pub fn append_utm_params(url: &str, ctx: &CampaignContext) -> String {
    if url.is_empty() {
        return url.to_string();
    }

    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| {
            key != "utm_source"
                && key != "utm_medium"
                && key != "utm_campaign"
                // a previously-set utm_content survives unless we replace it
                && !(key == "utm_content" && ctx.content.is_some())
        })
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("utm_source", UTM_SOURCE);
        pairs.append_pair("utm_medium", UTM_MEDIUM);
        pairs.append_pair(
            "utm_campaign",
            ctx.campaign.as_deref().unwrap_or("general"),
        );
        if let Some(content) = &ctx.content {
            pairs.append_pair("utm_content", content);
        }
    }

    parsed.to_string()
}

/// Campaign label for the current page path (fixed lookup)
pub fn page_campaign(path: &str) -> &'static str {
    if path == "/" {
        return "homepage";
    }
    if path.starts_with("/stories/") {
        return "story";
    }
    if path.starts_with("/missions/") {
        return "mission";
    }
    if path.starts_with("/events/") {
        return "event";
    }
    match path {
        "/about" => "about",
        "/contact" => "contact",
        "/volunteer" => "volunteer",
        _ => "general",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(campaign: &str, content: Option<&str>) -> CampaignContext {
        CampaignContext {
            campaign: Some(campaign.to_string()),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_appends_all_params_and_keeps_existing_query() {
        let tagged = append_utm_params(
            "https://pay.example?x=1",
            &ctx("mission", Some("guatemala-2024")),
        );

        assert!(tagged.contains("x=1"));
        assert!(tagged.contains("utm_source=dentalaidnetwork"));
        assert!(tagged.contains("utm_medium=website"));
        assert!(tagged.contains("utm_campaign=mission"));
        assert!(tagged.contains("utm_content=guatemala-2024"));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let context = ctx("mission", Some("guatemala-2024"));
        let once = append_utm_params("https://pay.example?x=1", &context);
        let twice = append_utm_params(&once, &context);

        assert_eq!(once, twice);
        assert_eq!(twice.matches("utm_campaign").count(), 1);
        assert_eq!(twice.matches("utm_source").count(), 1);
    }

    #[test]
    fn test_replaces_stale_campaign() {
        let tagged = append_utm_params(
            "https://pay.example?utm_campaign=story&x=1",
            &ctx("mission", None),
        );
        assert!(tagged.contains("utm_campaign=mission"));
        assert!(!tagged.contains("utm_campaign=story"));
        assert!(tagged.contains("x=1"));
    }

    #[test]
    fn test_campaign_defaults_to_general_and_content_is_optional() {
        let tagged = append_utm_params("https://pay.example", &CampaignContext::default());
        assert!(tagged.contains("utm_campaign=general"));
        assert!(!tagged.contains("utm_content"));
    }

    #[test]
    fn test_malformed_url_passes_through_unchanged() {
        assert_eq!(
            append_utm_params("not a valid url", &CampaignContext::default()),
            "not a valid url"
        );
        assert_eq!(append_utm_params("", &CampaignContext::default()), "");
        // relative URLs cannot be tagged either
        assert_eq!(
            append_utm_params("/donate", &CampaignContext::default()),
            "/donate"
        );
    }

    #[test]
    fn test_page_campaign_lookup() {
        assert_eq!(page_campaign("/"), "homepage");
        assert_eq!(page_campaign("/stories/winter-appeal"), "story");
        assert_eq!(page_campaign("/missions/guatemala-2024"), "mission");
        assert_eq!(page_campaign("/events/gala-dinner"), "event");
        assert_eq!(page_campaign("/about"), "about");
        assert_eq!(page_campaign("/contact"), "contact");
        assert_eq!(page_campaign("/volunteer"), "volunteer");
        assert_eq!(page_campaign("/stories"), "general");
        assert_eq!(page_campaign("/anything-else"), "general");
    }
}
