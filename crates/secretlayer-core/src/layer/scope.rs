//! Scope-bound configuration and the ambient active source

use std::future::Future;
use std::sync::Arc;

use crate::config::{ConfigError, ConfigResult, ConfigSource, ResolvedValue};
use crate::secrets::ClientHandle;

tokio::task_local! {
    static ACTIVE_CONFIG: Arc<dyn ConfigSource>;
}

/// A composed configuration source tied to an open secret manager client
///
/// The client stays open for as long as this value lives and is closed
/// exactly once when it is dropped, whether the scope ends normally, with an
/// error, by panic, or because the owning future was cancelled.
pub struct ScopedConfig {
    source: Arc<dyn ConfigSource>,
    handle: ClientHandle,
}

impl ScopedConfig {
    pub(crate) fn new(source: Arc<dyn ConfigSource>, handle: ClientHandle) -> Self {
        Self { source, handle }
    }

    /// The composed source
    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    /// The handle owning the secret manager client
    pub fn client(&self) -> &ClientHandle {
        &self.handle
    }

    /// Run `future` with this source installed as the active configuration
    ///
    /// The client is released when `future` completes or is dropped.
    pub async fn run<F: Future>(self, future: F) -> F::Output {
        let source = Arc::clone(&self.source);
        let output = ACTIVE_CONFIG.scope(source, future).await;
        self.close();
        output
    }

    /// End the scope now and release the client
    pub fn close(self) {
        self.handle.release();
    }
}

impl ConfigSource for ScopedConfig {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        self.source.lookup(key)
    }

    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        self.source.resolve(key)
    }
}

impl std::fmt::Debug for ScopedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedConfig")
            .field("source", &self.source.name())
            .field("client", &self.handle)
            .finish()
    }
}

/// The configuration source active in the current task
///
/// Fails with `ConfigError::NoActiveConfig` outside of `ScopedConfig::run`,
/// `SecretConfigLayer::scoped` or `with_config`.
pub fn current_config() -> ConfigResult<Arc<dyn ConfigSource>> {
    ACTIVE_CONFIG
        .try_with(Arc::clone)
        .map_err(|_| ConfigError::NoActiveConfig)
}

/// Run `future` with an arbitrary source installed as the active configuration
///
/// No client is involved; useful for wiring static configuration or for
/// testing code that reads `current_config`.
pub async fn with_config<F: Future>(source: Arc<dyn ConfigSource>, future: F) -> F::Output {
    ACTIVE_CONFIG.scope(source, future).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigSource;
    use crate::secrets::{MemorySecretManager, SecretManagerConnector};

    async fn scoped(manager: &MemorySecretManager) -> ScopedConfig {
        let handle = ClientHandle::new(manager.open("proj").await.unwrap());
        ScopedConfig::new(Arc::new(MapConfigSource::from_pairs([("k", "v")])), handle)
    }

    #[tokio::test]
    async fn test_no_active_config_outside_scope() {
        assert!(matches!(current_config(), Err(ConfigError::NoActiveConfig)));
    }

    #[tokio::test]
    async fn test_run_installs_active_config() {
        let manager = MemorySecretManager::new();
        let config = scoped(&manager).await;

        let value = config
            .run(async { current_config().unwrap().lookup("k").unwrap() })
            .await;

        assert_eq!(value, "v");
        assert_eq!(manager.close_count(), 1);
        assert!(matches!(current_config(), Err(ConfigError::NoActiveConfig)));
    }

    #[tokio::test]
    async fn test_scoped_config_is_a_source() {
        let manager = MemorySecretManager::new();
        let config = scoped(&manager).await;

        assert_eq!(config.name(), "map");
        assert_eq!(config.lookup("k").unwrap(), "v");
        assert!(!config.client().is_released());

        config.close();
        assert_eq!(manager.close_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_client() {
        let manager = MemorySecretManager::new();
        drop(scoped(&manager).await);
        assert_eq!(manager.close_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_releases_client() {
        let manager = MemorySecretManager::new();
        let config = scoped(&manager).await;

        let task = tokio::spawn(config.run(std::future::pending::<()>()));
        tokio::task::yield_now().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(manager.close_count(), 1);
    }

    #[tokio::test]
    async fn test_with_config() {
        let source: Arc<dyn ConfigSource> = Arc::new(MapConfigSource::from_pairs([("a", "1")]));
        let value = with_config(source, async { current_config().unwrap().lookup("a") })
            .await
            .unwrap();
        assert_eq!(value, "1");
    }
}
