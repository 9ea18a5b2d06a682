//! Secret-backed configuration providers with optional fallback

use std::future::Future;
use std::sync::Arc;

use crate::config::{
    ConfigMap, ConfigResult, ConfigSource, EnvConfigSource, FallbackConfigSource,
    JsonConfigSource, JsonDocument, MapConfigSource,
};
use crate::resolver::aggregate;
use crate::secrets::{ClientHandle, SecretManagerConnector};

use super::options::SecretProviderOptions;
use super::scope::ScopedConfig;

/// Name reported by the source holding fetched secrets
pub const SECRET_SOURCE_NAME: &str = "secret-manager";

/// What to consult when a key is not among the fetched secrets
#[derive(Debug, Clone)]
pub enum Fallback {
    /// Nothing; unknown keys are not found
    None,
    /// Process environment variables
    Environment(EnvConfigSource),
    /// A JSON document parsed at composition time
    Json(Arc<JsonConfigSource>),
}

/// Wrap fetched secrets as a source with no fallback
pub fn secrets_source(map: ConfigMap) -> Arc<dyn ConfigSource> {
    Arc::new(MapConfigSource::with_name(SECRET_SOURCE_NAME, map))
}

/// Wrap fetched secrets and chain the fallback behind them
///
/// The secret-derived source is always asked first.
pub fn compose_source(map: ConfigMap, fallback: &Fallback) -> Arc<dyn ConfigSource> {
    let secrets = secrets_source(map);
    match fallback {
        Fallback::None => secrets,
        Fallback::Environment(env) => {
            Arc::new(FallbackConfigSource::new(secrets, Arc::new(env.clone())))
        }
        Fallback::Json(json) => Arc::new(FallbackConfigSource::new(secrets, json.clone())),
    }
}

/// Builds configuration providers backed by a secret manager
///
/// Each `build` opens a client, fetches every requested secret concurrently,
/// and composes the result with the chosen fallback. Nothing is cached: every
/// call fetches afresh and yields an independent provider.
///
/// # Example
///
/// ```
/// use secretlayer_core::config::ConfigSource;
/// use secretlayer_core::layer::{current_config, SecretConfigLayer, SecretProviderOptions};
/// use secretlayer_core::secrets::MemorySecretManager;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = MemorySecretManager::new();
/// manager.insert("DB_PASSWORD", "s3cr3t");
///
/// let layer = SecretConfigLayer::with_env_fallback(
///     Arc::new(manager.clone()),
///     SecretProviderOptions::try_new("my-project", ["DB_PASSWORD"])?,
/// );
///
/// let password = layer
///     .scoped(|_| async { current_config()?.lookup("DB_PASSWORD") })
///     .await??;
/// assert_eq!(password, "s3cr3t");
/// assert_eq!(manager.close_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SecretConfigLayer {
    connector: Arc<dyn SecretManagerConnector>,
    options: SecretProviderOptions,
    fallback: Fallback,
}

impl SecretConfigLayer {
    /// Provider resolving only fetched secrets
    pub fn secrets_only(
        connector: Arc<dyn SecretManagerConnector>,
        options: SecretProviderOptions,
    ) -> Self {
        Self {
            connector,
            options,
            fallback: Fallback::None,
        }
    }

    /// Provider falling back to environment variables
    pub fn with_env_fallback(
        connector: Arc<dyn SecretManagerConnector>,
        options: SecretProviderOptions,
    ) -> Self {
        Self {
            connector,
            options,
            fallback: Fallback::Environment(EnvConfigSource::new()),
        }
    }

    /// Provider falling back to a JSON document
    ///
    /// The document is parsed here, once; malformed text fails composition
    /// with `ConfigError::Json` before any client is opened.
    pub fn with_json_fallback(
        connector: Arc<dyn SecretManagerConnector>,
        options: SecretProviderOptions,
        document: impl Into<JsonDocument>,
    ) -> ConfigResult<Self> {
        let json = JsonConfigSource::from_document(document.into())?;
        Ok(Self {
            connector,
            options,
            fallback: Fallback::Json(Arc::new(json)),
        })
    }

    /// Swap the fallback, e.g. for an environment source with a prefix
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn options(&self) -> &SecretProviderOptions {
        &self.options
    }

    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Open a client, fetch the secrets, and compose the provider
    ///
    /// Fails if the options are invalid or the client cannot be opened.
    /// Individual secret failures are tolerated and only show up as missing
    /// keys. If this future is dropped mid-fetch, the client is still closed.
    pub async fn build(&self) -> ConfigResult<ScopedConfig> {
        self.options.validate()?;

        let client = self.connector.open(&self.options.project_id).await?;
        let handle = ClientHandle::new(client);

        let map = aggregate(
            self.options.seed(),
            &self.options.secrets,
            handle.client().as_ref(),
            self.options.fetch_timeout(),
        )
        .await;

        Ok(ScopedConfig::new(compose_source(map, &self.fallback), handle))
    }

    /// Build the provider and run `f` inside its scope
    ///
    /// The source is passed to `f` and also installed as the active
    /// configuration for `current_config`. The client is released when the
    /// future returned by `f` finishes or is dropped.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> ConfigResult<T>
    where
        F: FnOnce(Arc<dyn ConfigSource>) -> Fut,
        Fut: Future<Output = T>,
    {
        let scoped = self.build().await?;
        let source = Arc::clone(scoped.source());
        Ok(scoped.run(f(source)).await)
    }
}

impl std::fmt::Debug for SecretConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfigLayer")
            .field("options", &self.options)
            .field("fallback", &self.fallback)
            .finish()
    }
}
