//! Configuration source trait

use std::str::FromStr;
use std::sync::Arc;

use crate::secrets::SecretManagerError;

use super::fallback::FallbackConfigSource;

/// Errors that can occur while composing or reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration key not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("At least one secret must be requested")]
    EmptySecrets,

    #[error("Configuration key requested by more than one secret: {0}")]
    DuplicateKey(String),

    #[error("No configuration is active in this scope")]
    NoActiveConfig,

    #[error("Secret manager error: {0}")]
    Secret(#[from] SecretManagerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the key is absent, as opposed to unreadable
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A value together with the source that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// The configuration value
    pub value: String,
    /// Name of the source that answered
    pub source: String,
}

impl ResolvedValue {
    pub fn new(value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }
}

/// Split a key path into its `.`-separated segments
pub(crate) fn path_segments(key: &str) -> Vec<&str> {
    key.split('.').filter(|s| !s.is_empty()).collect()
}

/// Source of configuration values keyed by path
///
/// Implementations:
/// - `MapConfigSource`: A fixed key/value map (secret-derived values)
/// - `EnvConfigSource`: Process environment variables
/// - `JsonConfigSource`: A parsed JSON document
/// - `FallbackConfigSource` / `ChainConfigSource`: Ordered fallback across sources
///
/// A lookup reports `ConfigError::NotFound` when the key is absent and any
/// other variant when the key exists but cannot be read.
///
/// # Example
///
/// ```
/// use secretlayer_core::config::{ConfigSource, ConfigSourceExt, MapConfigSource, EnvConfigSource};
///
/// let secrets = MapConfigSource::from_pairs([("DB_PASSWORD", "s3cr3t")]);
/// let config = secrets.or_else(EnvConfigSource::new());
///
/// assert_eq!(config.lookup("DB_PASSWORD").unwrap(), "s3cr3t");
/// ```
pub trait ConfigSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Look up the value for `key`
    fn lookup(&self, key: &str) -> ConfigResult<String>;

    /// Look up the value for `key` and report which source produced it
    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        self.lookup(key)
            .map(|value| ResolvedValue::new(value, self.name()))
    }

    /// Check if `key` resolves to a value
    fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_ok()
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        (**self).lookup(key)
    }

    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        (**self).resolve(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        (**self).lookup(key)
    }

    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        (**self).resolve(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

/// Combinators and typed reads for any configuration source
pub trait ConfigSourceExt: ConfigSource {
    /// Try `self` first, then `fallback` when `self` fails for any reason
    fn or_else<S>(self, fallback: S) -> FallbackConfigSource
    where
        Self: Sized + 'static,
        S: ConfigSource + 'static,
    {
        FallbackConfigSource::new(Arc::new(self), Arc::new(fallback))
    }

    /// Look up `key`, mapping not-found to `None`
    fn get_optional(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.lookup(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up `key` and parse it into `T`
    fn get_parsed<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.lookup(key)?;
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid_value(key, e.to_string()))
    }
}

impl<T: ConfigSource + ?Sized> ConfigSourceExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigSource;

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(path_segments("DB_PASSWORD"), vec!["DB_PASSWORD"]);
        assert_eq!(path_segments(".a..b."), vec!["a", "b"]);
        assert!(path_segments("").is_empty());
    }

    #[test]
    fn test_resolve_reports_source() {
        let source = MapConfigSource::from_pairs([("key", "value")]);
        let resolved = source.resolve("key").unwrap();
        assert_eq!(resolved, ResolvedValue::new("value", "map"));
    }

    #[test]
    fn test_get_optional() {
        let source = MapConfigSource::from_pairs([("key", "value")]);
        assert_eq!(source.get_optional("key").unwrap(), Some("value".to_string()));
        assert_eq!(source.get_optional("missing").unwrap(), None);
    }

    #[test]
    fn test_get_parsed() {
        let source = MapConfigSource::from_pairs([("port", " 5432 "), ("name", "db")]);
        assert_eq!(source.get_parsed::<u16>("port").unwrap(), 5432);

        let err = source.get_parsed::<u16>("name").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "name"));

        assert!(source.get_parsed::<u16>("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_arc_and_box_sources() {
        let arc: Arc<dyn ConfigSource> = Arc::new(MapConfigSource::from_pairs([("k", "v")]));
        assert_eq!(arc.name(), "map");
        assert!(arc.contains("k"));

        let boxed: Box<dyn ConfigSource> = Box::new(MapConfigSource::from_pairs([("k", "v")]));
        assert_eq!(boxed.lookup("k").unwrap(), "v");
        assert!(!boxed.contains("other"));
    }
}
