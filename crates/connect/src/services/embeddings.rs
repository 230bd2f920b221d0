//! Embedding-initialization calls to the indexing backend.
//!
//! After a tenant is fully linked, the backend builds a search index for each
//! connected data source. These calls are best-effort: a failure is logged
//! and the linking flow continues - indexing can be retried out-of-band.

use std::time::Duration;

use lorebot_core::TeamId;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::BackendApiConfig;

/// Timeout for outbound backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body for the init endpoints.
#[derive(Serialize)]
struct InitRequest<'a> {
    #[serde(rename = "tenantId")]
    tenant_id: &'a str,
}

/// Client for the embedding-initialization backend.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    config: BackendApiConfig,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmbeddingClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: BackendApiConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Kick off Notion index building for a tenant. Returns whether the
    /// backend accepted the request.
    pub async fn init_notion_embedding(&self, tenant_id: &TeamId) -> bool {
        self.init("notion-embedding/init", "notion", tenant_id).await
    }

    /// Kick off GitHub index building for a tenant. Returns whether the
    /// backend accepted the request.
    pub async fn init_github_embedding(&self, tenant_id: &TeamId) -> bool {
        self.init("github-embedding/init", "github", tenant_id).await
    }

    /// Kick off both index builds concurrently. Both are always attempted;
    /// one failing never cancels the other.
    pub async fn init_all(&self, tenant_id: &TeamId) -> (bool, bool) {
        tokio::join!(
            self.init_notion_embedding(tenant_id),
            self.init_github_embedding(tenant_id)
        )
    }

    async fn init(&self, endpoint: &str, source: &str, tenant_id: &TeamId) -> bool {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );

        let result = self
            .client
            .post(url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(&InitRequest {
                tenant_id: tenant_id.as_str(),
            })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(source, tenant = %tenant_id, "embedding initialization accepted");
                true
            }
            Ok(response) => {
                error!(
                    source,
                    tenant = %tenant_id,
                    status = %response.status(),
                    "embedding initialization failed"
                );
                false
            }
            Err(e) => {
                error!(source, tenant = %tenant_id, error = %e, "embedding initialization request failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with(base_url: &str) -> EmbeddingClient {
        EmbeddingClient::new(BackendApiConfig {
            base_url: base_url.to_string(),
            api_key: SecretString::from("backend-key"),
        })
    }

    #[tokio::test]
    async fn test_init_all_hits_both_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notion-embedding/init"))
            .and(header("x-api-key", "backend-key"))
            .and(body_json(serde_json::json!({"tenantId": "T1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/github-embedding/init"))
            .and(header("x-api-key", "backend-key"))
            .and(body_json(serde_json::json!({"tenantId": "T1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server.uri());
        let (notion_ok, github_ok) = client.init_all(&TeamId::new("T1")).await;

        assert!(notion_ok);
        assert!(github_ok);
    }

    #[tokio::test]
    async fn test_init_all_reports_failures_independently() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notion-embedding/init"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/github-embedding/init"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server.uri());
        let (notion_ok, github_ok) = client.init_all(&TeamId::new("T1")).await;

        assert!(!notion_ok);
        assert!(github_ok);
    }
}
