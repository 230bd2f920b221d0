//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ConnectConfig;
use crate::services::embeddings::EmbeddingClient;
use crate::services::github::GithubAppClient;
use crate::services::slack::SlackOAuthClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, outbound clients and
/// configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ConnectConfig,
    pool: PgPool,
    github: GithubAppClient,
    slack: SlackOAuthClient,
    embeddings: EmbeddingClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The outbound clients are built once from the configuration; provider
    /// credentials that are absent surface later as per-request
    /// configuration errors, not here.
    #[must_use]
    pub fn new(config: ConnectConfig, pool: PgPool) -> Self {
        let github = GithubAppClient::new(config.github.clone());
        let slack = SlackOAuthClient::new(config.slack.clone());
        let embeddings = EmbeddingClient::new(config.backend.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                github,
                slack,
                embeddings,
            }),
        }
    }

    /// Get a reference to the connect configuration.
    #[must_use]
    pub fn config(&self) -> &ConnectConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the GitHub App client.
    #[must_use]
    pub fn github(&self) -> &GithubAppClient {
        &self.inner.github
    }

    /// Get a reference to the Slack OAuth client.
    #[must_use]
    pub fn slack(&self) -> &SlackOAuthClient {
        &self.inner.slack
    }

    /// Get a reference to the embedding backend client.
    #[must_use]
    pub fn embeddings(&self) -> &EmbeddingClient {
        &self.inner.embeddings
    }
}
