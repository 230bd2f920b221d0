//! Credential read/write endpoints.
//!
//! The frontend renders connection status from the `GET` projection and
//! submits Notion credentials through the `POST`. Writes are partial: a
//! field the client omits (or sends empty) never overwrites a stored value.

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{PgTenantStore, TenantStore};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Tenant;
use crate::state::AppState;

/// Connection status projection returned to the frontend.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub github_app_installed: bool,
    pub github_app_installation_id: String,
    pub has_slack_integration: bool,
}

impl TokenStatus {
    /// Project a tenant record (or its absence) into the status payload.
    fn from_tenant(tenant: Option<&Tenant>) -> Self {
        Self {
            notion_api_key: tenant
                .and_then(|t| t.notion_api_key.clone())
                .unwrap_or_default(),
            notion_database_id: tenant
                .and_then(|t| t.notion_database_id.clone())
                .unwrap_or_default(),
            github_app_installed: tenant.is_some_and(|t| t.github_app_installed),
            github_app_installation_id: tenant
                .and_then(|t| t.github_app_installation_id.clone())
                .unwrap_or_default(),
            has_slack_integration: tenant.is_some_and(Tenant::has_slack_integration),
        }
    }
}

/// Write request body. Both fields optional; at least one must be set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenWriteRequest {
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
}

/// Read the connection status for the current user.
///
/// # Route
///
/// `GET /user/tokens`
pub async fn read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse> {
    let store = PgTenantStore::new(state.pool().clone());
    let tenant = store.get(user.id).await?;

    Ok(Json(TokenStatus::from_tenant(tenant.as_ref())))
}

/// Partially upsert the Notion credentials for the current user.
///
/// # Route
///
/// `POST /user/tokens`
pub async fn write(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<TokenWriteRequest>,
) -> Result<impl IntoResponse> {
    let api_key = normalize(request.notion_api_key);
    let database_id = normalize(request.notion_database_id);

    if api_key.is_none() && database_id.is_none() {
        return Err(AppError::BadRequest(
            "at least one of notionApiKey or notionDatabaseId is required".to_string(),
        ));
    }

    let store = PgTenantStore::new(state.pool().clone());
    store
        .upsert_notion_tokens(user.id, api_key.as_deref(), database_id.as_deref())
        .await?;

    Ok(Json(json!({"success": true})))
}

/// Treat empty strings as absent, so they never overwrite stored values.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lorebot_core::{TeamId, UserId};

    use super::*;

    #[test]
    fn test_normalize_drops_empty_strings() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some(String::new())), None);
        assert_eq!(normalize(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_status_for_missing_tenant() {
        let status = TokenStatus::from_tenant(None);
        assert_eq!(
            status,
            TokenStatus {
                notion_api_key: String::new(),
                notion_database_id: String::new(),
                github_app_installed: false,
                github_app_installation_id: String::new(),
                has_slack_integration: false,
            }
        );
    }

    #[test]
    fn test_status_projection() {
        let mut tenant = Tenant::empty(UserId::new(1));
        tenant.notion_api_key = Some("secret_abc".to_string());
        tenant.notion_database_id = Some("db123".to_string());
        tenant.github_app_installation_id = Some("inst1".to_string());
        tenant.github_app_installed = true;
        tenant.tenant_id = Some(TeamId::new("T1"));
        tenant.slack_bot_token = Some("xoxb-1".to_string());

        let status = TokenStatus::from_tenant(Some(&tenant));
        assert_eq!(status.notion_api_key, "secret_abc");
        assert_eq!(status.notion_database_id, "db123");
        assert!(status.github_app_installed);
        assert_eq!(status.github_app_installation_id, "inst1");
        assert!(status.has_slack_integration);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = TokenStatus::from_tenant(None);
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("notionApiKey").is_some());
        assert!(json.get("hasSlackIntegration").is_some());
        assert!(json.get("notion_api_key").is_none());
    }

    #[test]
    fn test_write_request_accepts_partial_body() {
        let request: TokenWriteRequest =
            serde_json::from_str(r#"{"notionApiKey": "secret_abc"}"#).unwrap();
        assert_eq!(request.notion_api_key.as_deref(), Some("secret_abc"));
        assert!(request.notion_database_id.is_none());
    }
}
