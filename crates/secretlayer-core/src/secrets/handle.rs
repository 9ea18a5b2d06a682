//! Scope guard around an open secret manager client

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::traits::SecretManagerClient;

/// Owns an open client and closes it exactly once
///
/// The client is closed on `release` or on drop, whichever comes first. Drop
/// also runs when a future holding the handle is cancelled or a panic unwinds
/// through it, so every exit path releases the connection.
pub struct ClientHandle {
    client: Arc<dyn SecretManagerClient>,
    released: AtomicBool,
}

impl ClientHandle {
    /// Take ownership of an open client
    pub fn new(client: Arc<dyn SecretManagerClient>) -> Self {
        Self {
            client,
            released: AtomicBool::new(false),
        }
    }

    /// The wrapped client
    pub fn client(&self) -> &Arc<dyn SecretManagerClient> {
        &self.client
    }

    /// Whether the client has been closed through this handle
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Close the client now; later calls and the eventual drop are no-ops
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            tracing::debug!(
                client = self.client.name(),
                project_id = self.client.project_id(),
                "releasing secret manager client"
            );
            self.client.close();
        }
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("client", &self.client.name())
            .field("project_id", &self.client.project_id())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{MemorySecretManager, SecretManagerConnector};

    #[tokio::test]
    async fn test_handle_closes_on_drop() {
        let manager = MemorySecretManager::new();
        let handle = ClientHandle::new(manager.open("proj").await.unwrap());
        assert!(!handle.is_released());

        drop(handle);
        assert_eq!(manager.close_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_release_is_idempotent() {
        let manager = MemorySecretManager::new();
        let handle = ClientHandle::new(manager.open("proj").await.unwrap());

        handle.release();
        handle.release();
        assert!(handle.is_released());
        drop(handle);

        assert_eq!(manager.close_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_closes_on_panic() {
        let manager = MemorySecretManager::new();
        let client = manager.open("proj").await.unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _handle = ClientHandle::new(client);
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(manager.close_count(), 1);
    }
}
