//! Core traits and types for talking to a secret manager

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Build the resource name of the latest version of a secret
///
/// Versions are never pinned; every lookup resolves `latest`.
///
/// # Example
///
/// ```
/// use secretlayer_core::secrets::secret_version_name;
///
/// assert_eq!(
///     secret_version_name("my-project", "DB_PASSWORD"),
///     "projects/my-project/secrets/DB_PASSWORD/versions/latest",
/// );
/// ```
pub fn secret_version_name(project_id: &str, secret: &str) -> String {
    format!("projects/{}/secrets/{}/versions/latest", project_id, secret)
}

/// Errors that can occur while opening or querying a secret manager
#[derive(Error, Debug)]
pub enum SecretManagerError {
    #[error("Failed to open secret manager client: {0}")]
    Open(String),

    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret {name} has no readable payload: {reason}")]
    InvalidPayload { name: String, reason: String },

    #[error("Secret manager API error ({status}) for {name}: {message}")]
    Api {
        name: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out fetching secret {0}")]
    Timeout(String),

    #[error("Secret manager client is closed")]
    Closed,
}

impl SecretManagerError {
    /// Create an invalid payload error
    pub fn invalid_payload(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the secret does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type SecretManagerResult<T> = Result<T, SecretManagerError>;

/// An open connection to a secret manager, scoped to one project
///
/// Implementations:
/// - `HttpSecretManager`: REST client for the hosted secret manager API
/// - `MemorySecretManager`: In-process store for tests and local runs
///
/// A client is shared read-only across concurrent fetches, so every method
/// takes `&self`.
#[async_trait]
pub trait SecretManagerClient: Send + Sync {
    /// Human-readable name of this client
    fn name(&self) -> &str;

    /// Project the client was opened for
    fn project_id(&self) -> &str;

    /// Fetch the payload of the latest version of `secret`
    ///
    /// Fails with `NotFound` when the secret does not exist, and with other
    /// variants when the payload is unreadable or the remote call fails.
    async fn access_secret_version(&self, secret: &str) -> SecretManagerResult<String>;

    /// Release the connection
    ///
    /// Must be safe to call more than once; only the first call has effect.
    fn close(&self);
}

/// Opens clients for a given project
#[async_trait]
pub trait SecretManagerConnector: Send + Sync {
    /// Open a client for `project_id`
    ///
    /// Failure here is fatal to composition: nothing downstream is built.
    async fn open(&self, project_id: &str) -> SecretManagerResult<Arc<dyn SecretManagerClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_version_name() {
        assert_eq!(
            secret_version_name("proj-1", "api-key"),
            "projects/proj-1/secrets/api-key/versions/latest"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(SecretManagerError::NotFound("x".into()).is_not_found());
        assert!(!SecretManagerError::Timeout("x".into()).is_not_found());
        assert!(!SecretManagerError::invalid_payload("x", "empty").is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = SecretManagerError::Api {
            name: "db".into(),
            status: 403,
            message: "denied".into(),
        };
        assert_eq!(err.to_string(), "Secret manager API error (403) for db: denied");
        assert_eq!(
            SecretManagerError::invalid_payload("db", "empty payload").to_string(),
            "Secret db has no readable payload: empty payload"
        );
    }
}
