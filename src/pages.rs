//! Server-rendered content pages
//!
//! Minimal semantic HTML for the public site: homepage sections, stories,
//! missions, events, flat pages and the donation success page. Styling and
//! animation live elsewhere; this module only guarantees that every page
//! renders (from CMS content when available, from hardcoded defaults when
//! not) and that every outbound donate link is UTM-tagged.

use crate::{
    api::{fetch_payment, ApiState},
    content::{
        fallback, portable_text_paragraphs, Event, HomepageSection, Mission, SiteSettings, Story,
    },
    utm::{append_utm_params, page_campaign, CampaignContext},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::debug;

/// Build the content-page router
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(home))
        .route("/stories", get(stories_index))
        .route("/stories/:slug", get(story_detail))
        .route("/missions", get(missions_index))
        .route("/missions/:slug", get(mission_detail))
        .route("/events", get(events_index))
        .route("/events/:slug", get(event_detail))
        .route("/about", get(|state: State<ApiState>| flat_page(state, "about")))
        .route(
            "/contact",
            get(|state: State<ApiState>| flat_page(state, "contact")),
        )
        .route(
            "/volunteer",
            get(|state: State<ApiState>| flat_page(state, "volunteer")),
        )
        .route("/success", get(success))
        .fallback(not_found)
}

/// Escape text for HTML element and attribute content
fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped value of an optional CMS field, empty when absent
fn opt(text: &Option<String>) -> String {
    text.as_deref().map(esc).unwrap_or_default()
}

/// Format a minor-unit amount as pounds
fn format_pounds(minor: i64) -> String {
    format!("£{:.2}", minor as f64 / 100.0)
}

/// Build a tagged outbound donate link for the current page.
///
/// Uses the document's own donate URL when it has one, else the site-wide
/// donate URL; the campaign comes from the page path and the content value is
/// the document slug.
fn donate_link(
    settings: &SiteSettings,
    path: &str,
    content: Option<&str>,
    override_url: Option<&str>,
) -> String {
    let base = override_url.unwrap_or(&settings.primary_donate_url);
    append_utm_params(
        base,
        &CampaignContext {
            campaign: Some(page_campaign(path).to_string()),
            content: content.map(str::to_string),
        },
    )
}

/// Shared HTML shell: announcement bar, header with donate CTA, footer
fn page_shell(settings: &SiteSettings, path: &str, title: &str, main: &str) -> Html<String> {
    let mut head = String::new();

    if let Some(bar) = &settings.announcement_bar {
        if bar.enabled {
            if let Some(text) = &bar.text {
                head.push_str(&format!("<div class=\"announcement\">{}", esc(text)));
                if let (Some(label), Some(url)) = (&bar.link_label, &bar.link_url) {
                    head.push_str(&format!(" <a href=\"{}\">{}</a>", esc(url), esc(label)));
                }
                head.push_str("</div>\n");
            }
        }
    }

    let cta_label = settings.header_cta_label.as_deref().unwrap_or("Donate");
    let header_donate = donate_link(settings, path, None, None);

    let mut footer = String::new();
    if let Some(text) = &settings.footer_text {
        footer.push_str(&format!("<p>{}</p>", esc(text)));
    }
    if let Some(email) = &settings.contact_email {
        footer.push_str(&format!(
            "<p><a href=\"mailto:{0}\">{0}</a></p>",
            esc(email)
        ));
    }

    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | {site_name}</title>\n</head>\n<body>\n{head}\
         <header>\n<a href=\"/\">{site_name}</a>\n<nav>\n\
         <a href=\"/missions\">Missions</a>\n<a href=\"/stories\">Stories</a>\n\
         <a href=\"/events\">Events</a>\n<a href=\"/about\">About</a>\n\
         <a href=\"/volunteer\">Volunteer</a>\n<a href=\"/contact\">Contact</a>\n\
         <a class=\"donate\" href=\"{donate}\">{cta}</a>\n</nav>\n</header>\n\
         <main>\n{main}</main>\n<footer>\n{footer}</footer>\n</body>\n</html>\n",
        title = esc(title),
        site_name = esc(&settings.site_name),
        head = head,
        donate = esc(&header_donate),
        cta = esc(cta_label),
        main = main,
        footer = footer,
    ))
}

/// Render a portable-text body as plain paragraphs
fn render_body(body: &Option<serde_json::Value>) -> String {
    let Some(body) = body else {
        return String::new();
    };
    portable_text_paragraphs(body)
        .iter()
        .map(|paragraph| format!("<p>{}</p>\n", esc(paragraph)))
        .collect()
}

fn render_story_card(story: &Story) -> String {
    format!(
        "<article><h3><a href=\"/stories/{slug}\">{title}</a></h3><p>{excerpt}</p></article>\n",
        slug = esc(&story.slug.current),
        title = esc(&story.title),
        excerpt = opt(&story.excerpt),
    )
}

fn render_mission_card(mission: &Mission) -> String {
    format!(
        "<article><h3><a href=\"/missions/{slug}\">{title}</a></h3>\
         <p>{location}</p><p>{excerpt}</p></article>\n",
        slug = esc(&mission.slug.current),
        title = esc(&mission.title),
        location = opt(&mission.location),
        excerpt = opt(&mission.excerpt),
    )
}

fn render_event_card(event: &Event) -> String {
    format!(
        "<article><h3><a href=\"/events/{slug}\">{title}</a></h3>\
         <p><time datetime=\"{iso}\">{date}</time>{location}</p><p>{excerpt}</p></article>\n",
        slug = esc(&event.slug.current),
        title = esc(&event.title),
        iso = event.start_date.to_rfc3339(),
        date = event.start_date.format("%d %B %Y"),
        location = event
            .location
            .as_deref()
            .map(|l| format!(" · {}", esc(l)))
            .unwrap_or_default(),
        excerpt = opt(&event.excerpt),
    )
}

/// Handle `GET /`
async fn home(State(state): State<ApiState>) -> Response {
    state.app.analytics.page_view("/", None);

    let settings = state.app.content.site_settings().await;
    let sections = state.app.content.homepage_sections().await;

    let mut main = String::new();
    for section in &sections {
        if !section.is_enabled() {
            continue;
        }
        match section {
            HomepageSection::HeroSection {
                overline,
                headline,
                highlighted_text,
                subheadline,
                primary_cta_label,
                secondary_cta_label,
                secondary_cta_link,
                trust_metrics,
            } => {
                main.push_str("<section class=\"hero\">\n");
                if overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                }
                main.push_str(&format!(
                    "<h1>{} <em>{}</em></h1>\n",
                    opt(headline),
                    opt(highlighted_text)
                ));
                if subheadline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(subheadline)));
                }
                main.push_str(&format!(
                    "<a class=\"donate\" href=\"{}\">{}</a>\n",
                    esc(&donate_link(&settings, "/", None, None)),
                    esc(primary_cta_label.as_deref().unwrap_or("Donate now")),
                ));
                if let (Some(label), Some(link)) = (secondary_cta_label, secondary_cta_link) {
                    main.push_str(&format!(
                        "<a href=\"{}\">{}</a>\n",
                        esc(link),
                        esc(label)
                    ));
                }
                if let Some(metrics) = trust_metrics {
                    main.push_str("<ul>\n");
                    for metric in metrics {
                        main.push_str(&format!(
                            "<li><strong>{}</strong> {}</li>\n",
                            opt(&metric.value),
                            opt(&metric.label)
                        ));
                    }
                    main.push_str("</ul>\n");
                }
                main.push_str("</section>\n");
            }
            HomepageSection::TrustStripSection { .. } => {
                if let Some(items) = &settings.trust_items {
                    main.push_str("<section class=\"trust\"><ul>\n");
                    for item in items {
                        main.push_str(&format!("<li>{}</li>\n", esc(item)));
                    }
                    main.push_str("</ul></section>\n");
                }
            }
            HomepageSection::DonationIntentSection {
                problem_overline,
                problem_statement,
                narrative_text,
                help_overline,
                help_headline,
                general_donation_title,
                general_donation_description,
                general_donation_cta_label,
                mission_donation_title,
                mission_donation_description,
                mission_donation_cta_label,
                ..
            } => {
                main.push_str("<section class=\"donation-intent\">\n");
                if problem_overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(problem_overline)));
                }
                main.push_str(&format!("<h2>{}</h2>\n", opt(problem_statement)));
                if narrative_text.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(narrative_text)));
                }
                if help_overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(help_overline)));
                }
                if help_headline.is_some() {
                    main.push_str(&format!("<h2>{}</h2>\n", opt(help_headline)));
                }
                main.push_str(&format!(
                    "<article><h3>{}</h3><p>{}</p><a class=\"donate\" href=\"{}\">{}</a></article>\n",
                    opt(general_donation_title),
                    opt(general_donation_description),
                    esc(&donate_link(&settings, "/", None, None)),
                    esc(general_donation_cta_label
                        .as_deref()
                        .unwrap_or("Donate now")),
                ));
                main.push_str(&format!(
                    "<article><h3>{}</h3><p>{}</p><a href=\"/missions\">{}</a></article>\n",
                    opt(mission_donation_title),
                    opt(mission_donation_description),
                    esc(mission_donation_cta_label
                        .as_deref()
                        .unwrap_or("Browse missions")),
                ));
                main.push_str("</section>\n");
            }
            HomepageSection::FeaturedStorySection {
                overline,
                read_more_label,
                view_all_label,
                ..
            } => {
                if let Some(story) = state.app.content.featured_story().await {
                    main.push_str("<section class=\"featured-story\">\n");
                    if overline.is_some() {
                        main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                    }
                    main.push_str(&render_story_card(&story));
                    main.push_str(&format!(
                        "<a href=\"/stories/{}\">{}</a>\n<a href=\"/stories\">{}</a>\n",
                        esc(&story.slug.current),
                        esc(read_more_label.as_deref().unwrap_or("Read more")),
                        esc(view_all_label.as_deref().unwrap_or("All stories")),
                    ));
                    main.push_str("</section>\n");
                }
            }
            HomepageSection::LatestMissionsSection {
                overline,
                headline,
                view_all_label,
                count,
                ..
            } => {
                let missions = state.app.content.latest_missions().await;
                main.push_str("<section class=\"latest-missions\">\n");
                if overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                }
                main.push_str(&format!(
                    "<h2>{}</h2>\n",
                    headline.as_deref().map(esc).unwrap_or_else(|| "Latest missions".to_string())
                ));
                for mission in missions.iter().take(count.unwrap_or(3)) {
                    main.push_str(&render_mission_card(mission));
                }
                main.push_str(&format!(
                    "<a href=\"/missions\">{}</a>\n</section>\n",
                    esc(view_all_label.as_deref().unwrap_or("All missions")),
                ));
            }
            HomepageSection::UpcomingEventsSection {
                overline,
                headline,
                view_all_label,
                count,
                ..
            } => {
                let events = state.app.content.upcoming_events().await;
                main.push_str("<section class=\"upcoming-events\">\n");
                if overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                }
                main.push_str(&format!(
                    "<h2>{}</h2>\n",
                    headline.as_deref().map(esc).unwrap_or_else(|| "Upcoming events".to_string())
                ));
                for event in events.iter().take(count.unwrap_or(3)) {
                    main.push_str(&render_event_card(event));
                }
                main.push_str(&format!(
                    "<a href=\"/events\">{}</a>\n</section>\n",
                    esc(view_all_label.as_deref().unwrap_or("All events")),
                ));
            }
            HomepageSection::VolunteerCtaSection {
                overline,
                headline,
                description,
                cta_label,
                cta_link,
                benefits,
                ..
            } => {
                main.push_str("<section class=\"volunteer-cta\">\n");
                if overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                }
                main.push_str(&format!("<h2>{}</h2>\n", opt(headline)));
                if description.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(description)));
                }
                if let Some(benefits) = benefits {
                    main.push_str("<ul>\n");
                    for benefit in benefits {
                        main.push_str(&format!(
                            "<li><strong>{}</strong> {}</li>\n",
                            opt(&benefit.value),
                            opt(&benefit.label)
                        ));
                    }
                    main.push_str("</ul>\n");
                }
                main.push_str(&format!(
                    "<a href=\"{}\">{}</a>\n</section>\n",
                    esc(cta_link.as_deref().unwrap_or("/volunteer")),
                    esc(cta_label.as_deref().unwrap_or("Volunteer")),
                ));
            }
            HomepageSection::FinalCtaSection {
                headline,
                highlighted_text,
                description,
                trust_points,
                cta_label,
                ..
            } => {
                main.push_str("<section class=\"final-cta\">\n");
                main.push_str(&format!(
                    "<h2>{} <em>{}</em></h2>\n",
                    opt(headline),
                    opt(highlighted_text)
                ));
                if description.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(description)));
                }
                if let Some(points) = trust_points {
                    main.push_str("<ul>\n");
                    for point in points {
                        main.push_str(&format!("<li>{}</li>\n", esc(point)));
                    }
                    main.push_str("</ul>\n");
                }
                main.push_str(&format!(
                    "<a class=\"donate\" href=\"{}\">{}</a>\n</section>\n",
                    esc(&donate_link(&settings, "/", None, None)),
                    esc(cta_label.as_deref().unwrap_or("Donate now")),
                ));
            }
            HomepageSection::EmailCaptureSection {
                overline,
                headline,
                description,
                ..
            } => {
                main.push_str("<section class=\"email-capture\">\n");
                if overline.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(overline)));
                }
                main.push_str(&format!("<h2>{}</h2>\n", opt(headline)));
                if description.is_some() {
                    main.push_str(&format!("<p>{}</p>\n", opt(description)));
                }
                main.push_str(&email_signup_form("homepage"));
                main.push_str("</section>\n");
            }
            HomepageSection::Unknown => {}
        }
    }

    page_shell(&settings, "/", "Home", &main).into_response()
}

/// Signup form posting JSON to the subscribe gateway
fn email_signup_form(source: &str) -> String {
    format!(
        "<form id=\"signup-{source}\" data-source=\"{source}\">\n\
         <input type=\"email\" name=\"email\" placeholder=\"Your email\" required>\n\
         <button type=\"submit\">Subscribe</button>\n<p class=\"signup-result\"></p>\n</form>\n\
         <script>document.getElementById('signup-{source}').addEventListener('submit',async e=>{{\
         e.preventDefault();const f=e.target;\
         const r=await fetch('/api/subscribe',{{method:'POST',\
         headers:{{'Content-Type':'application/json'}},\
         body:JSON.stringify({{email:f.email.value}})}});const d=await r.json();\
         f.querySelector('.signup-result').textContent=d.message||d.error;}});</script>\n"
    )
}

/// Handle `GET /stories`
async fn stories_index(State(state): State<ApiState>) -> Response {
    state.app.analytics.page_view("/stories", None);
    let settings = state.app.content.site_settings().await;
    let stories = state.app.content.stories().await;

    let mut main = String::from("<h1>Stories</h1>\n");
    if stories.is_empty() {
        main.push_str("<p>No stories published yet — check back soon.</p>\n");
    }
    for story in &stories {
        main.push_str(&render_story_card(story));
    }

    page_shell(&settings, "/stories", "Stories", &main).into_response()
}

/// Handle `GET /stories/{slug}`
async fn story_detail(State(state): State<ApiState>, Path(slug): Path<String>) -> Response {
    let path = format!("/stories/{}", slug);
    state.app.analytics.page_view(&path, None);
    let settings = state.app.content.site_settings().await;

    let Some(story) = state.app.content.story(&slug).await else {
        return not_found_page(&settings).into_response();
    };

    let mut main = format!("<h1>{}</h1>\n", esc(&story.title));
    if let Some(published) = &story.published_at {
        main.push_str(&format!(
            "<p><time datetime=\"{}\">{}</time></p>\n",
            published.to_rfc3339(),
            published.format("%d %B %Y")
        ));
    }
    if story.excerpt.is_some() {
        main.push_str(&format!("<p>{}</p>\n", opt(&story.excerpt)));
    }
    main.push_str(&render_body(&story.body));
    main.push_str(&format!(
        "<a class=\"donate\" href=\"{}\">Donate</a>\n",
        esc(&donate_link(
            &settings,
            &path,
            Some(&story.slug.current),
            story.donate_url.as_deref(),
        )),
    ));

    page_shell(&settings, &path, &story.title, &main).into_response()
}

/// Handle `GET /missions`
async fn missions_index(State(state): State<ApiState>) -> Response {
    state.app.analytics.page_view("/missions", None);
    let settings = state.app.content.site_settings().await;
    let missions = state.app.content.missions().await;

    let mut main = String::from("<h1>Missions</h1>\n");
    if missions.is_empty() {
        main.push_str("<p>No missions published yet — check back soon.</p>\n");
    }
    for mission in &missions {
        main.push_str(&render_mission_card(mission));
    }

    page_shell(&settings, "/missions", "Missions", &main).into_response()
}

/// Handle `GET /missions/{slug}`
async fn mission_detail(State(state): State<ApiState>, Path(slug): Path<String>) -> Response {
    let path = format!("/missions/{}", slug);
    state.app.analytics.page_view(&path, None);
    let settings = state.app.content.site_settings().await;

    let Some(mission) = state.app.content.mission(&slug).await else {
        return not_found_page(&settings).into_response();
    };

    let mut main = format!("<h1>{}</h1>\n", esc(&mission.title));
    if mission.location.is_some() {
        main.push_str(&format!("<p>{}</p>\n", opt(&mission.location)));
    }
    if let Some(range) = &mission.date_range {
        if let (Some(start), Some(end)) = (&range.start, &range.end) {
            main.push_str(&format!("<p>{} – {}</p>\n", esc(start), esc(end)));
        }
    }
    if let Some(status) = &mission.status {
        main.push_str(&format!("<p>Status: {}</p>\n", esc(status)));
    }
    if let (Some(goal), Some(raised)) = (mission.funding_goal, mission.funding_raised) {
        main.push_str(&format!(
            "<p>{} raised of {} goal</p>\n",
            format_pounds(raised),
            format_pounds(goal)
        ));
    }
    if mission.excerpt.is_some() {
        main.push_str(&format!("<p>{}</p>\n", opt(&mission.excerpt)));
    }
    main.push_str(&render_body(&mission.body));
    main.push_str(&format!(
        "<a class=\"donate\" href=\"{}\">Fund this mission</a>\n",
        esc(&donate_link(
            &settings,
            &path,
            Some(&mission.slug.current),
            mission.donate_url.as_deref(),
        )),
    ));

    page_shell(&settings, &path, &mission.title, &main).into_response()
}

/// Handle `GET /events`
async fn events_index(State(state): State<ApiState>) -> Response {
    state.app.analytics.page_view("/events", None);
    let settings = state.app.content.site_settings().await;
    let events = state.app.content.events().await;

    let mut main = String::from("<h1>Events</h1>\n");
    if events.is_empty() {
        main.push_str("<p>No events scheduled yet — check back soon.</p>\n");
    }
    for event in &events {
        main.push_str(&render_event_card(event));
    }

    page_shell(&settings, "/events", "Events", &main).into_response()
}

/// Handle `GET /events/{slug}`
async fn event_detail(State(state): State<ApiState>, Path(slug): Path<String>) -> Response {
    let path = format!("/events/{}", slug);
    state.app.analytics.page_view(&path, None);
    let settings = state.app.content.site_settings().await;

    let Some(event) = state.app.content.event(&slug).await else {
        return not_found_page(&settings).into_response();
    };

    let mut main = format!("<h1>{}</h1>\n", esc(&event.title));
    main.push_str(&format!(
        "<p><time datetime=\"{}\">{}</time></p>\n",
        event.start_date.to_rfc3339(),
        event.start_date.format("%d %B %Y")
    ));
    if event.location.is_some() {
        main.push_str(&format!("<p>{}</p>\n", opt(&event.location)));
    }
    if event.excerpt.is_some() {
        main.push_str(&format!("<p>{}</p>\n", opt(&event.excerpt)));
    }
    main.push_str(&render_body(&event.body));
    if let Some(registration) = &event.registration_url {
        // Registration leaves the site, so it gets tagged like a donate link
        main.push_str(&format!(
            "<a href=\"{}\">Register</a>\n",
            esc(&donate_link(
                &settings,
                &path,
                Some(&event.slug.current),
                Some(registration),
            )),
        ));
    }
    if event.donate_url.is_some() {
        main.push_str(&format!(
            "<a class=\"donate\" href=\"{}\">Support this event</a>\n",
            esc(&donate_link(
                &settings,
                &path,
                Some(&event.slug.current),
                event.donate_url.as_deref(),
            )),
        ));
    }

    page_shell(&settings, &path, &event.title, &main).into_response()
}

/// Render a flat content page, falling back to hardcoded copy
async fn flat_page(State(state): State<ApiState>, slug: &'static str) -> Response {
    let path = format!("/{}", slug);
    state.app.analytics.page_view(&path, None);
    let settings = state.app.content.site_settings().await;

    let (title, mut main) = match state.app.content.page(slug).await {
        Some(page) => {
            let mut main = format!("<h1>{}</h1>\n", esc(&page.title));
            main.push_str(&render_body(&page.body));
            (page.title, main)
        }
        None => {
            debug!("No CMS page for '{}'; rendering fallback copy", slug);
            let title = fallback::page_title(slug).to_string();
            let mut main = format!("<h1>{}</h1>\n", esc(&title));
            for paragraph in fallback::page_paragraphs(slug) {
                main.push_str(&format!("<p>{}</p>\n", esc(&paragraph)));
            }
            (title, main)
        }
    };

    // The volunteer page carries the signup form; applications go through
    // the same mailing-list gateway with volunteer tags
    if slug == "volunteer" {
        main.push_str(&email_signup_form("volunteer"));
    }

    page_shell(&settings, &path, &title, &main).into_response()
}

/// Query parameters for the success page
#[derive(Debug, Deserialize)]
struct SuccessParams {
    /// Checkout session id appended by the payment provider on redirect
    session: Option<String>,
}

/// Handle `GET /success`: the post-donation thank-you page
async fn success(State(state): State<ApiState>, Query(params): Query<SuccessParams>) -> Response {
    state.app.analytics.page_view("/success", None);
    let settings = state.app.content.site_settings().await;

    let mut main = String::from("<h1>Thank you!</h1>\n");

    // Show donation details when the provider handed us a session id and the
    // lookup succeeds; a plain thank-you otherwise
    if let Some(session_id) = params.session.as_deref() {
        match fetch_payment(state.app.payments.as_ref(), session_id).await {
            Ok(payment) => {
                let name = payment
                    .first_name
                    .as_deref()
                    .map(|n| format!(", {}", esc(n)))
                    .unwrap_or_default();
                main.push_str(&format!(
                    "<p>Thank you{} for your {} donation of {}.</p>\n",
                    name,
                    if payment.is_subscription {
                        "monthly"
                    } else {
                        "one-time"
                    },
                    format_pounds(payment.amount),
                ));
                if let Some(intention) = &payment.intention {
                    main.push_str(&format!(
                        "<p>Your gift is earmarked for: {}</p>\n",
                        esc(intention)
                    ));
                }
            }
            Err(e) => {
                debug!("Success page could not load session: {}", e);
                main.push_str("<p>Your donation was received. A receipt is on its way.</p>\n");
            }
        }
    } else {
        main.push_str("<p>Your donation was received. A receipt is on its way.</p>\n");
    }

    main.push_str("<p><a href=\"/\">Back to the homepage</a></p>\n");

    page_shell(&settings, "/success", "Thank you", &main).into_response()
}

/// Fallback 404 page
async fn not_found(State(state): State<ApiState>) -> Response {
    let settings = state.app.content.site_settings().await;
    not_found_page(&settings).into_response()
}

fn not_found_page(settings: &SiteSettings) -> (StatusCode, Html<String>) {
    let main = "<h1>Page not found</h1>\n\
                <p>The page you're looking for doesn't exist.</p>\n\
                <p><a href=\"/\">Back to the homepage</a></p>\n";
    (
        StatusCode::NOT_FOUND,
        page_shell(settings, "", "Page not found", main),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esc_covers_html_metacharacters() {
        assert_eq!(
            esc("<script>\"&'</script>"),
            "&lt;script&gt;&quot;&amp;&#39;&lt;/script&gt;"
        );
        assert_eq!(esc("plain text"), "plain text");
    }

    #[test]
    fn test_format_pounds() {
        assert_eq!(format_pounds(100), "£1.00");
        assert_eq!(format_pounds(2500), "£25.00");
        assert_eq!(format_pounds(1234), "£12.34");
    }

    #[test]
    fn test_donate_link_is_tagged_with_page_campaign() {
        let settings = fallback::site_settings();

        let link = donate_link(&settings, "/missions/guatemala-2024", Some("guatemala-2024"), None);
        assert!(link.contains("utm_campaign=mission"));
        assert!(link.contains("utm_content=guatemala-2024"));
        assert!(link.starts_with(&settings.primary_donate_url));

        let link = donate_link(&settings, "/", None, None);
        assert!(link.contains("utm_campaign=homepage"));
    }

    #[test]
    fn test_donate_link_prefers_document_url() {
        let settings = fallback::site_settings();
        let link = donate_link(
            &settings,
            "/stories/winter",
            Some("winter"),
            Some("https://pay.example/winter"),
        );
        assert!(link.starts_with("https://pay.example/winter"));
        assert!(link.contains("utm_campaign=story"));
    }

    #[test]
    fn test_page_shell_escapes_cms_text() {
        let mut settings = fallback::site_settings();
        settings.site_name = "Dental <Aid> Network".to_string();

        let Html(html) = page_shell(&settings, "/", "Home", "<p>body</p>");
        assert!(html.contains("Dental &lt;Aid&gt; Network"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("utm_campaign=homepage"));
    }
}
