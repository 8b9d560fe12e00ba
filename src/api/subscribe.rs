//! Email signup endpoint
//!
//! Serves both the newsletter signup forms and the volunteer application
//! form (which submits with volunteer tags and extra merge fields).

use super::{error_response, ApiState};
use crate::{
    mailchimp::{build_member_payload, MailingListProvider, SubscribeOutcome, SubscribeRequest},
    SiteResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

/// Successful signup response; covers new-subscriber, already-subscribed and
/// development-simulated cases alike
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    /// Always true on this path
    pub success: bool,
    /// User-facing confirmation message
    pub message: String,
}

/// Validate a signup and upsert the member with the provider
pub(crate) async fn process_subscribe(
    provider: &dyn MailingListProvider,
    req: &SubscribeRequest,
) -> SiteResult<SubscribeOutcome> {
    req.validate()?;
    provider.upsert_member(&build_member_payload(req)).await
}

/// Handle `POST /api/subscribe`
pub async fn subscribe(
    State(state): State<ApiState>,
    Json(req): Json<SubscribeRequest>,
) -> impl IntoResponse {
    info!("API: subscribe request: tags={:?}", req.tags);

    match process_subscribe(state.app.mailing.as_ref(), &req).await {
        Ok(outcome) => {
            state.app.analytics.email_signup("success", None);
            (
                StatusCode::OK,
                Json(SubscribeResponse {
                    success: true,
                    message: outcome.user_message().to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            state.app.analytics.email_signup("error", Some(&e.to_string()));
            error_response(&e).into_response()
        }
    }
}
