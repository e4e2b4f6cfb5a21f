//! FCM HTTP v1 client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{NotifyError, NotifyResult};
use crate::token::TokenCache;
use crate::{DeliveryOutcome, Notifier};

const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Configuration for the FCM client.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Firebase project id
    pub project_id: String,
    /// Endpoint override for tests; defaults to the public FCM endpoint
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl NotifyConfig {
    /// Create config from environment variables.
    pub fn from_env() -> NotifyResult<Self> {
        Ok(Self {
            project_id: std::env::var("FCM_PROJECT_ID")
                .map_err(|_| NotifyError::Config("FCM_PROJECT_ID not set".to_string()))?,
            endpoint: std::env::var("FCM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                std::env::var("FCM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

/// How the client obtains bearer tokens.
enum TokenSource {
    Gcp(TokenCache),
    /// Fixed token, used by tests against a mock endpoint.
    Static(String),
}

/// FCM HTTP v1 push client.
pub struct FcmClient {
    http: reqwest::Client,
    config: NotifyConfig,
    tokens: TokenSource,
}

#[derive(Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl FcmClient {
    /// Create a client using the ambient GCP service-account credentials.
    pub async fn new(config: NotifyConfig) -> NotifyResult<Self> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| NotifyError::auth(format!("GCP auth provider: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        Ok(Self {
            http,
            config,
            tokens: TokenSource::Gcp(TokenCache::new(Arc::from(provider))),
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> NotifyResult<Self> {
        let config = NotifyConfig::from_env()?;
        Self::new(config).await
    }

    /// Create a client with a fixed bearer token. For tests.
    pub fn with_static_token(config: NotifyConfig, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens: TokenSource::Static(token.into()),
        }
    }

    async fn bearer_token(&self) -> NotifyResult<String> {
        match &self.tokens {
            TokenSource::Gcp(cache) => cache.get_token().await,
            TokenSource::Static(token) => Ok(token.clone()),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project_id
        )
    }
}

#[async_trait::async_trait]
impl Notifier for FcmClient {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> NotifyResult<DeliveryOutcome> {
        // A recipient without a registered device cannot be delivered to;
        // skip the network round trip entirely.
        if token.is_empty() {
            debug!("No device token registered, rejecting delivery");
            return Ok(DeliveryOutcome::Rejected);
        }

        let bearer = self.bearer_token().await?;

        let request = FcmRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification { title, body },
                data,
            },
        };

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(bearer)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "FCM accepted message");
            return Ok(DeliveryOutcome::Delivered);
        }

        let detail = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            warn!(status = %status, detail = %detail, "FCM rejected message");
            Ok(DeliveryOutcome::Rejected)
        } else {
            Err(NotifyError::transport(format!(
                "FCM returned {status}: {detail}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: String) -> NotifyConfig {
        NotifyConfig {
            project_id: "test-project".to_string(),
            endpoint,
            timeout: Duration::from_secs(5),
        }
    }

    fn data() -> HashMap<String, String> {
        HashMap::from([("alert_id".to_string(), "7".to_string())])
    }

    #[tokio::test]
    async fn test_send_delivered_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/test-project/messages:send"))
            .and(header("authorization", "Bearer fake-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/test-project/messages/1"
            })))
            .mount(&server)
            .await;

        let client = FcmClient::with_static_token(test_config(server.uri()), "fake-token");
        let outcome = client
            .send("device-token", "Theft detected", "Camera Lobby", &data())
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_send_rejected_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = FcmClient::with_static_token(test_config(server.uri()), "fake-token");
        let outcome = client
            .send("stale-token", "title", "body", &data())
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_send_transport_error_on_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = FcmClient::with_static_token(test_config(server.uri()), "fake-token");
        let result = client.send("device-token", "title", "body", &data()).await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }

    #[tokio::test]
    async fn test_empty_token_short_circuits() {
        // No mock server mounted: a network call would fail the test.
        let client = FcmClient::with_static_token(
            test_config("http://127.0.0.1:1".to_string()),
            "fake-token",
        );
        let outcome = client.send("", "title", "body", &data()).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Rejected);
    }
}
