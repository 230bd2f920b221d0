//! Slack OAuth route handlers.
//!
//! The callback is a browser-only flow: every outcome - success or any of
//! the denial codes - terminates in a redirect to the setup page with the
//! outcome encoded as a query parameter. The orchestrator in
//! `services::link` owns the decision; this module only translates.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::PgTenantStore;
use crate::middleware::OptionalUser;
use crate::models::session_keys;
use crate::services::link::{SlackCallback, SlackLinkOutcome, link_slack_workspace};
use crate::state::AppState;

/// Setup page the callback always redirects back to.
const SETUP_PAGE: &str = "/setup/slack";

/// Sign-in page for unauthenticated callbacks.
const SIGNIN_PAGE: &str = "/auth/signin";

/// Query parameters from Slack's OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// State parameter from the install redirect. Accepted, not enforced.
    pub state: Option<String>,
}

/// Generate a cryptographically random string for the OAuth state nonce.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Translate a link outcome into the setup-page redirect.
fn setup_redirect(outcome: &SlackLinkOutcome) -> Redirect {
    match outcome {
        SlackLinkOutcome::Success { .. } => Redirect::to(&format!("{SETUP_PAGE}?success=true")),
        SlackLinkOutcome::Denied(denial) => {
            Redirect::to(&format!("{SETUP_PAGE}?error={}", denial.query_code()))
        }
    }
}

/// Initiate the Slack install: redirect to the consent screen.
///
/// # Route
///
/// `GET /integrations/slack/install`
pub async fn install(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    if let Err(e) = session
        .insert(session_keys::SLACK_OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to(&format!("{SETUP_PAGE}?error=server_error")).into_response();
    }

    let redirect_uri = format!("{}/integrations/slack/callback", state.config().base_url);

    match state.slack().authorize_url(&redirect_uri, &oauth_state) {
        Some(url) => Redirect::to(&url).into_response(),
        None => {
            tracing::error!("Slack client id is not configured");
            Redirect::to(&format!("{SETUP_PAGE}?error=config_missing")).into_response()
        }
    }
}

/// Handle the Slack OAuth callback.
///
/// # Route
///
/// `GET /integrations/slack/callback?code=&error=&state=`
pub async fn callback(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(user) = user else {
        return Redirect::to(SIGNIN_PAGE).into_response();
    };

    let store = PgTenantStore::new(state.pool().clone());
    let callback = SlackCallback {
        code: query.code,
        error: query.error,
    };

    let outcome = link_slack_workspace(
        &store,
        state.slack(),
        state.embeddings(),
        user.id,
        &callback,
    )
    .await;

    setup_redirect(&outcome).into_response()
}
