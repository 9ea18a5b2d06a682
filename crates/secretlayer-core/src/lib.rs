//! SecretLayer Core
//!
//! Configuration values fetched from a remote secret manager, with optional
//! fallback to environment variables or a JSON document.
//!
//! ## Pipeline
//!
//! - `secrets`: open a project-scoped secret manager client
//! - `resolver`: fetch every requested secret concurrently, tolerating
//!   individual failures, into a `ConfigMap`
//! - `config`: expose the map as a `ConfigSource` and chain fallbacks
//! - `layer`: tie the result to a scope that closes the client on exit
//!
//! ```rust,ignore
//! use secretlayer_core::{HttpSecretManager, HttpSecretManagerConfig, SecretConfigLayer, SecretProviderOptions};
//! use std::sync::Arc;
//!
//! let layer = SecretConfigLayer::with_env_fallback(
//!     Arc::new(HttpSecretManager::new(HttpSecretManagerConfig::default())),
//!     SecretProviderOptions::try_new("my-project", ["DB_PASSWORD"])?,
//! );
//!
//! layer.scoped(|config| async move {
//!     let password = config.lookup("DB_PASSWORD")?;
//!     connect(&password).await
//! }).await??;
//! ```

pub mod secrets;
pub mod config;
pub mod resolver;
pub mod layer;
pub mod logging;

// Re-export commonly used types
pub use secrets::{
    SecretManagerClient, SecretManagerConnector, SecretManagerError, SecretManagerResult,
    HttpSecretManager, HttpSecretManagerConfig, MemorySecretManager, ClientHandle,
    secret_version_name,
};

pub use config::{
    ConfigSource, ConfigSourceExt, ConfigError, ConfigResult, ConfigMap, ResolvedValue,
    MapConfigSource, EnvConfigSource, JsonConfigSource, JsonDocument,
    FallbackConfigSource, ChainConfigSource,
};

pub use resolver::{aggregate, SecretSpec, SecretSpecs, SecretFetchOutcome};

pub use layer::{
    SecretConfigLayer, SecretProviderOptions, ScopedConfig, Fallback,
    current_config, with_config,
};
