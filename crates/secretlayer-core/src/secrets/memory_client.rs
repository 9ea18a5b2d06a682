//! In-memory secret manager

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{
    SecretManagerClient, SecretManagerConnector, SecretManagerError, SecretManagerResult,
};

#[derive(Debug, Default)]
struct MemoryState {
    secrets: RwLock<HashMap<String, String>>,
    failures: RwLock<HashMap<String, String>>,
    delays: RwLock<HashMap<String, Duration>>,
    open_error: RwLock<Option<String>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

/// In-memory secret manager for testing and local runs
///
/// Acts as both the connector and the backing store. Every client it opens
/// shares the same secrets, so values inserted after `open` are visible.
/// Secrets are keyed by name only; the project id is recorded but not used
/// for lookups.
///
/// Besides plain values it can simulate the failure modes of a remote store:
/// refusing to open, erroring on a specific secret, or answering slowly.
///
/// # Example
///
/// ```
/// use secretlayer_core::secrets::{MemorySecretManager, SecretManagerClient, SecretManagerConnector};
///
/// # #[tokio::main]
/// # async fn main() {
/// let manager = MemorySecretManager::new();
/// manager.insert("DB_PASSWORD", "s3cr3t");
///
/// let client = manager.open("my-project").await.unwrap();
/// assert_eq!(client.access_secret_version("DB_PASSWORD").await.unwrap(), "s3cr3t");
/// client.close();
/// assert_eq!(manager.close_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretManager {
    state: Arc<MemoryState>,
}

impl MemorySecretManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with initial secrets
    pub fn with_secrets(initial: HashMap<String, String>) -> Self {
        let manager = Self::new();
        *manager.state.secrets.write() = initial;
        manager
    }

    /// Store a secret value
    pub fn insert(&self, name: &str, value: &str) {
        self.state
            .secrets
            .write()
            .insert(name.to_string(), value.to_string());
    }

    /// Remove a secret
    pub fn remove(&self, name: &str) {
        self.state.secrets.write().remove(name);
    }

    /// Make every access of `name` fail with an API error carrying `message`
    pub fn fail_secret(&self, name: &str, message: &str) {
        self.state
            .failures
            .write()
            .insert(name.to_string(), message.to_string());
    }

    /// Delay every access of `name` by `delay`
    pub fn delay_secret(&self, name: &str, delay: Duration) {
        self.state.delays.write().insert(name.to_string(), delay);
    }

    /// Make `open` fail with `message`
    pub fn fail_open(&self, message: &str) {
        *self.state.open_error.write() = Some(message.to_string());
    }

    /// Number of clients opened so far
    pub fn open_count(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    /// Number of `close` calls across all clients, including repeated ones
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.state.secrets.read().len()
    }

    /// Check if the manager holds no secrets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretManagerConnector for MemorySecretManager {
    async fn open(&self, project_id: &str) -> SecretManagerResult<Arc<dyn SecretManagerClient>> {
        if let Some(message) = self.state.open_error.read().clone() {
            return Err(SecretManagerError::Open(message));
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemorySecretClient {
            state: Arc::clone(&self.state),
            project_id: project_id.to_string(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Client handed out by `MemorySecretManager::open`
#[derive(Debug)]
pub struct MemorySecretClient {
    state: Arc<MemoryState>,
    project_id: String,
    closed: AtomicBool,
}

#[async_trait]
impl SecretManagerClient for MemorySecretClient {
    fn name(&self) -> &str {
        "memory"
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn access_secret_version(&self, secret: &str) -> SecretManagerResult<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SecretManagerError::Closed);
        }

        let delay = self.state.delays.read().get(secret).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.state.failures.read().get(secret) {
            return Err(SecretManagerError::Api {
                name: secret.to_string(),
                status: 500,
                message: message.clone(),
            });
        }

        self.state
            .secrets
            .read()
            .get(secret)
            .cloned()
            .ok_or_else(|| SecretManagerError::NotFound(secret.to_string()))
    }

    fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}
