//! REST client for the hosted secret manager API
//!
//! Talks to `{endpoint}/v1/{version}:access` with a bearer token and decodes
//! the base64 payload of the response.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::traits::{
    secret_version_name, SecretManagerClient, SecretManagerConnector, SecretManagerError,
    SecretManagerResult,
};

/// Environment variable consulted when no access token is configured
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for `HttpSecretManager`
#[derive(Debug, Clone)]
pub struct HttpSecretManagerConfig {
    /// Base URL of the API, without the `/v1` suffix
    pub endpoint: String,
    /// Bearer token; falls back to `GOOGLE_OAUTH_ACCESS_TOKEN` when unset
    pub access_token: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpSecretManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HttpSecretManagerConfig {
    /// Override the API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use an explicit access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Override the request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn resolve_token(&self) -> SecretManagerResult<String> {
        self.access_token
            .clone()
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                SecretManagerError::Open(format!(
                    "no access token configured and {} is not set",
                    ACCESS_TOKEN_ENV
                ))
            })
    }
}

/// Connector that opens REST clients against the secret manager API
///
/// # Example
///
/// ```no_run
/// use secretlayer_core::secrets::{HttpSecretManager, HttpSecretManagerConfig, SecretManagerConnector};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connector = HttpSecretManager::new(
///     HttpSecretManagerConfig::default().with_access_token("ya29.token"),
/// );
/// let client = connector.open("my-project").await?;
/// let password = client.access_secret_version("DB_PASSWORD").await?;
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpSecretManager {
    config: HttpSecretManagerConfig,
}

impl HttpSecretManager {
    /// Create a connector with the given settings
    pub fn new(config: HttpSecretManagerConfig) -> Self {
        Self { config }
    }

    /// Get the connection settings
    pub fn config(&self) -> &HttpSecretManagerConfig {
        &self.config
    }
}

#[async_trait]
impl SecretManagerConnector for HttpSecretManager {
    /// Build a client and check that the project is reachable with the token
    ///
    /// Lists at most one secret of the project; an unreachable endpoint, a
    /// rejected token or any other non-success status fails the open.
    async fn open(&self, project_id: &str) -> SecretManagerResult<Arc<dyn SecretManagerClient>> {
        if project_id.trim().is_empty() {
            return Err(SecretManagerError::Open("project id is empty".to_string()));
        }
        let token = self.config.resolve_token()?;
        let http = Client::builder()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| SecretManagerError::Open(format!("failed to build HTTP client: {}", e)))?;

        let client = HttpSecretClient {
            http,
            endpoint: self.config.endpoint.trim_end_matches('/').to_string(),
            token,
            project_id: project_id.to_string(),
            closed: AtomicBool::new(false),
        };
        client.verify().await?;

        tracing::debug!(project_id, endpoint = %client.endpoint, "opened secret manager client");
        Ok(Arc::new(client))
    }
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: Option<SecretPayload>,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client handed out by `HttpSecretManager::open`
pub struct HttpSecretClient {
    http: Client,
    endpoint: String,
    token: String,
    project_id: String,
    closed: AtomicBool,
}

impl HttpSecretClient {
    fn access_url(&self, secret: &str) -> String {
        format!(
            "{}/v1/{}:access",
            self.endpoint,
            secret_version_name(&self.project_id, secret)
        )
    }

    fn verify_url(&self) -> String {
        format!("{}/v1/projects/{}/secrets?pageSize=1", self.endpoint, self.project_id)
    }

    async fn verify(&self) -> SecretManagerResult<()> {
        let response = self
            .http
            .get(self.verify_url())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                SecretManagerError::Open(format!("secret manager unreachable at {}: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SecretManagerError::Open(format!(
            "project {} rejected with status {}: {}",
            self.project_id,
            status.as_u16(),
            api_message(body)
        )))
    }
}

#[async_trait]
impl SecretManagerClient for HttpSecretClient {
    fn name(&self) -> &str {
        "http"
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn access_secret_version(&self, secret: &str) -> SecretManagerResult<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SecretManagerError::Closed);
        }

        let response = self
            .http
            .get(self.access_url(secret))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| send_error(secret, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(secret, status, body));
        }

        let body: AccessResponse = response.json().await?;
        decode_payload(secret, body)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(project_id = %self.project_id, "closed secret manager client");
        }
    }
}

impl std::fmt::Debug for HttpSecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSecretClient")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

fn send_error(secret: &str, error: reqwest::Error) -> SecretManagerError {
    if error.is_timeout() {
        SecretManagerError::Timeout(secret.to_string())
    } else {
        SecretManagerError::Http(error)
    }
}

/// Map a non-success response for `secret` to an error
fn status_error(secret: &str, status: StatusCode, body: String) -> SecretManagerError {
    if status == StatusCode::NOT_FOUND {
        return SecretManagerError::NotFound(secret.to_string());
    }
    SecretManagerError::Api {
        name: secret.to_string(),
        status: status.as_u16(),
        message: api_message(body),
    }
}

/// The `error.message` of an API error body, or the raw body
fn api_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body)
}

fn decode_payload(secret: &str, body: AccessResponse) -> SecretManagerResult<String> {
    let data = body
        .payload
        .and_then(|p| p.data)
        .ok_or_else(|| SecretManagerError::invalid_payload(secret, "response has no payload"))?;

    let bytes = BASE64
        .decode(data.as_bytes())
        .map_err(|e| SecretManagerError::invalid_payload(secret, format!("bad base64: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|_| SecretManagerError::invalid_payload(secret, "payload is not UTF-8"))
}
