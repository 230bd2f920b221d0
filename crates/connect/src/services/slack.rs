//! Slack OAuth v2 code exchange.
//!
//! # OAuth Scopes
//!
//! The following bot scopes are requested on install:
//! - `app_mentions:read` - Read @mentions
//! - `channels:history` - Read channel messages
//! - `chat:write` - Send answers
//! - `im:history` - Read direct messages
//! - `im:write` - Send direct messages

use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::config::SlackOAuthConfig;

/// Bot scopes requested when installing the Slack app.
pub const OAUTH_SCOPES: &[&str] = &[
    "app_mentions:read",
    "channels:history",
    "chat:write",
    "im:history",
    "im:write",
];

/// Timeout for outbound Slack API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Slack OAuth exchange.
#[derive(Debug, thiserror::Error)]
pub enum SlackOAuthError {
    /// Client id or secret is not configured.
    #[error("Slack OAuth credentials are not configured")]
    NotConfigured,

    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be decoded or had a non-success status.
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Response from Slack's `oauth.v2.access` endpoint.
///
/// Slack reports failures in-band: a 200 with `ok: false` and an `error`
/// code. Callers must check `ok` before trusting the other fields.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthAccessResponse {
    /// Whether the exchange succeeded.
    pub ok: bool,
    /// Bot access token.
    pub access_token: Option<String>,
    /// Granted scopes.
    pub scope: Option<String>,
    /// Bot user ID.
    pub bot_user_id: Option<String>,
    /// Workspace the app was installed into.
    pub team: Option<OAuthTeam>,
    /// Error code when `ok` is false.
    pub error: Option<String>,
}

/// Team information from the OAuth response.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTeam {
    /// Team ID.
    pub id: String,
    /// Team name.
    pub name: Option<String>,
}

/// Client for Slack's OAuth v2 token endpoint.
#[derive(Clone)]
pub struct SlackOAuthClient {
    client: Client,
    config: SlackOAuthConfig,
}

impl std::fmt::Debug for SlackOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackOAuthClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlackOAuthClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: SlackOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Whether OAuth credentials are configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    /// Build the consent-screen URL for installing the app, or `None` when
    /// no client id is configured.
    #[must_use]
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Option<String> {
        let client_id = self.config.client_id.as_deref()?;
        let scopes = OAUTH_SCOPES.join(",");

        Some(format!(
            "https://slack.com/oauth/v2/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            urlencoding::encode(client_id),
            urlencoding::encode(&scopes),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `SlackOAuthError::NotConfigured` when credentials are missing
    /// and `SlackOAuthError::Request`/`Response` on transport failures.
    /// Slack-reported failures come back as `ok: false` in the response.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthAccessResponse, SlackOAuthError> {
        let (client_id, client_secret) = self
            .config
            .credentials()
            .ok_or(SlackOAuthError::NotConfigured)?;

        let url = format!(
            "{}/oauth.v2.access",
            self.config.api_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret.expose_secret()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| SlackOAuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackOAuthError::Response(format!(
                "token exchange failed with status {status}: {body}"
            )));
        }

        let token_response: OAuthAccessResponse = response
            .json()
            .await
            .map_err(|e| SlackOAuthError::Response(e.to_string()))?;

        debug!(ok = token_response.ok, "Slack OAuth exchange completed");

        Ok(token_response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::DEFAULT_SLACK_API_URL;

    use super::*;

    fn client_with(api_url: &str) -> SlackOAuthClient {
        SlackOAuthClient::new(SlackOAuthConfig {
            client_id: Some("client-id".to_string()),
            client_secret: Some(SecretString::from("client-secret")),
            api_url: api_url.to_string(),
        })
    }

    #[test]
    fn test_authorize_url_contains_scopes_and_state() {
        let client = client_with(DEFAULT_SLACK_API_URL);
        let url = client
            .authorize_url("https://example.com/callback", "nonce123")
            .unwrap();

        assert!(url.starts_with("https://slack.com/oauth/v2/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=nonce123"));
        // URL encoding converts : to %3A
        assert!(url.contains("chat%3Awrite"));
    }

    #[test]
    fn test_authorize_url_unconfigured() {
        let client = SlackOAuthClient::new(SlackOAuthConfig {
            client_id: None,
            client_secret: None,
            api_url: DEFAULT_SLACK_API_URL.to_string(),
        });
        assert!(client.authorize_url("https://example.com/cb", "s").is_none());
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth.v2.access"))
            .and(body_string_contains("code=xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "access_token": "xoxb-1",
                "scope": "chat:write",
                "bot_user_id": "U1",
                "team": {"id": "T1", "name": "Acme"}
            })))
            .mount(&server)
            .await;

        let client = client_with(&server.uri());
        let response = client.exchange_code("xyz").await.unwrap();

        assert!(response.ok);
        assert_eq!(response.access_token.as_deref(), Some("xoxb-1"));
        let team = response.team.unwrap();
        assert_eq!(team.id, "T1");
        assert_eq!(team.name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_exchange_code_slack_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth.v2.access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "error": "invalid_code"
            })))
            .mount(&server)
            .await;

        let client = client_with(&server.uri());
        let response = client.exchange_code("bad").await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("invalid_code"));
        assert!(response.access_token.is_none());
    }

    #[tokio::test]
    async fn test_exchange_code_not_configured() {
        let client = SlackOAuthClient::new(SlackOAuthConfig {
            client_id: None,
            client_secret: None,
            api_url: DEFAULT_SLACK_API_URL.to_string(),
        });

        let result = client.exchange_code("xyz").await;
        assert!(matches!(result, Err(SlackOAuthError::NotConfigured)));
    }

    #[test]
    fn test_response_deserializes_minimal_error() {
        let json = r#"{"ok": false, "error": "invalid_code"}"#;
        let response: OAuthAccessResponse = serde_json::from_str(json).unwrap();

        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("invalid_code"));
        assert!(response.team.is_none());
    }
}
