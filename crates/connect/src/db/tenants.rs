//! Tenant credential repository.
//!
//! One row per user, written exclusively through per-provider upserts so that
//! each provider's fields are only ever set together. The store is a trait so
//! the linking orchestrator can be tested against an in-memory
//! implementation; `PgTenantStore` is the production backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lorebot_core::{TeamId, UserId};

use super::RepositoryError;
use crate::models::Tenant;

/// Storage operations for tenant credential records.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Fetch the credential record for a user, if one exists.
    async fn get(&self, user_id: UserId) -> Result<Option<Tenant>, RepositoryError>;

    /// Upsert the Notion fields. `None` fields are left untouched on an
    /// existing record (partial update, not replace).
    async fn upsert_notion_tokens(
        &self,
        user_id: UserId,
        api_key: Option<&str>,
        database_id: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Upsert the GitHub App fields. The installation id, access token and
    /// installed flag are always written together in a single statement;
    /// repeated links overwrite the stored token.
    async fn upsert_github_installation(
        &self,
        user_id: UserId,
        installation_id: &str,
        access_token: &str,
    ) -> Result<(), RepositoryError>;

    /// Upsert the Slack fields after a successful OAuth exchange.
    async fn upsert_slack_workspace(
        &self,
        user_id: UserId,
        team_id: &TeamId,
        bot_token: &str,
    ) -> Result<(), RepositoryError>;
}

/// Database row for `connect.tenant`.
#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    user_id: i32,
    tenant_id: Option<String>,
    notion_api_key: Option<String>,
    notion_database_id: Option<String>,
    github_app_installation_id: Option<String>,
    github_access_token: Option<String>,
    github_app_installed: bool,
    slack_bot_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            tenant_id: row.tenant_id.map(TeamId::new),
            notion_api_key: row.notion_api_key,
            notion_database_id: row.notion_database_id,
            github_app_installation_id: row.github_app_installation_id,
            github_access_token: row.github_access_token,
            github_app_installed: row.github_app_installed,
            slack_bot_token: row.slack_bot_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed tenant store.
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    /// Create a new tenant store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r"
            SELECT user_id, tenant_id, notion_api_key, notion_database_id,
                   github_app_installation_id, github_access_token,
                   github_app_installed, slack_bot_token,
                   created_at, updated_at
            FROM connect.tenant
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Tenant::from))
    }

    async fn upsert_notion_tokens(
        &self,
        user_id: UserId,
        api_key: Option<&str>,
        database_id: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO connect.tenant (user_id, notion_api_key, notion_database_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                notion_api_key = COALESCE(EXCLUDED.notion_api_key, tenant.notion_api_key),
                notion_database_id = COALESCE(EXCLUDED.notion_database_id, tenant.notion_database_id),
                updated_at = NOW()
            ",
        )
        .bind(user_id.as_i32())
        .bind(api_key)
        .bind(database_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_github_installation(
        &self,
        user_id: UserId,
        installation_id: &str,
        access_token: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO connect.tenant
                (user_id, github_app_installation_id, github_access_token, github_app_installed)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (user_id) DO UPDATE SET
                github_app_installation_id = EXCLUDED.github_app_installation_id,
                github_access_token = EXCLUDED.github_access_token,
                github_app_installed = TRUE,
                updated_at = NOW()
            ",
        )
        .bind(user_id.as_i32())
        .bind(installation_id)
        .bind(access_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_slack_workspace(
        &self,
        user_id: UserId,
        team_id: &TeamId,
        bot_token: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO connect.tenant (user_id, tenant_id, slack_bot_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                tenant_id = EXCLUDED.tenant_id,
                slack_bot_token = EXCLUDED.slack_bot_token,
                updated_at = NOW()
            ",
        )
        .bind(user_id.as_i32())
        .bind(team_id.as_str())
        .bind(bot_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
