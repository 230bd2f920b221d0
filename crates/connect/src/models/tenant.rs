//! Tenant credential record.
//!
//! One record per user, holding the credentials for each connected provider.
//! "Provider X connected" is always derived from field presence, never stored
//! on its own - with the single exception of `github_app_installed`, which is
//! persisted for queryability and kept in sync by the one write path that
//! sets it together with the installation id.

use chrono::{DateTime, Utc};

use lorebot_core::{TeamId, UserId};

/// Per-user credential record for the connected providers.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Owning user; exactly one record exists per user.
    pub user_id: UserId,
    /// Slack team ID, set once Slack linking succeeds. Partition key for
    /// downstream embedding jobs.
    pub tenant_id: Option<TeamId>,
    /// Notion integration API key.
    pub notion_api_key: Option<String>,
    /// Notion database ID to index.
    pub notion_database_id: Option<String>,
    /// GitHub App installation ID.
    pub github_app_installation_id: Option<String>,
    /// Installation access token from the most recent GitHub link.
    pub github_access_token: Option<String>,
    /// Convenience flag; must always equal `github_app_installation_id`
    /// being present.
    pub github_app_installed: bool,
    /// Slack bot token from the OAuth exchange.
    pub slack_bot_token: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Create an empty record for a user, with no providers connected.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            tenant_id: None,
            notion_api_key: None,
            notion_database_id: None,
            github_app_installation_id: None,
            github_access_token: None,
            github_app_installed: false,
            slack_bot_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether Notion is connected: both the API key and database ID are set.
    #[must_use]
    pub fn has_notion_integration(&self) -> bool {
        is_present(self.notion_api_key.as_deref()) && is_present(self.notion_database_id.as_deref())
    }

    /// Whether the GitHub App is installed: the flag and the installation ID
    /// must both be set.
    #[must_use]
    pub fn has_github_integration(&self) -> bool {
        self.github_app_installed && is_present(self.github_app_installation_id.as_deref())
    }

    /// Whether Slack is connected: both the team ID and bot token are set.
    #[must_use]
    pub fn has_slack_integration(&self) -> bool {
        self.tenant_id.as_ref().is_some_and(|t| !t.as_str().is_empty())
            && is_present(self.slack_bot_token.as_deref())
    }
}

/// A field counts as present only when it is set and non-empty.
fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
