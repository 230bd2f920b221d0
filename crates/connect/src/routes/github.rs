//! GitHub App route handlers.
//!
//! The GitHub App installation flow redirects the browser back to
//! `/auth/github?installation_id=...`; the handler exchanges the app
//! assertion for an installation token and persists the credentials.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::db::PgTenantStore;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::link::link_github_installation;
use crate::state::AppState;

/// Query parameters from the GitHub App installation redirect.
#[derive(Debug, Deserialize)]
pub struct InstallationQuery {
    /// Installation identifier assigned by GitHub.
    pub installation_id: Option<String>,
    /// `install` or `update`; informational only.
    pub setup_action: Option<String>,
}

/// Handle the GitHub App installation callback.
///
/// Requires a session. Exchanges a signed app assertion for an installation
/// access token and upserts the credential record.
///
/// # Route
///
/// `GET /auth/github?installation_id=<id>`
pub async fn link(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<InstallationQuery>,
) -> Result<impl IntoResponse> {
    let Some(installation_id) = query
        .installation_id
        .as_deref()
        .filter(|id| !id.is_empty())
    else {
        return Err(AppError::BadRequest(
            "installation_id is required".to_string(),
        ));
    };

    let store = PgTenantStore::new(state.pool().clone());
    link_github_installation(&store, state.github(), user.id, installation_id).await?;

    Ok(Json(json!({"success": true})))
}

/// Redirect to the GitHub App installation page.
///
/// # Route
///
/// `GET /integrations/github/install`
pub async fn install(State(state): State<AppState>) -> Response {
    let Some(slug) = state.github().app_slug() else {
        tracing::error!("GITHUB_APP_SLUG is not configured");
        return Redirect::to("/setup/github?error=config_missing").into_response();
    };

    let url = format!("https://github.com/apps/{slug}/installations/new");
    Redirect::to(&url).into_response()
}
