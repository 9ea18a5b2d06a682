//! Ordered fallback across configuration sources

use std::sync::Arc;

use super::traits::{ConfigError, ConfigResult, ConfigSource, ResolvedValue};

/// Two sources tried in a fixed order
///
/// A lookup goes to the primary first. If the primary fails for any reason,
/// not-found or otherwise, the secondary is asked and its result, success or
/// error, is what the caller sees.
///
/// # Example
///
/// ```
/// use secretlayer_core::config::{ConfigSource, FallbackConfigSource, MapConfigSource};
/// use std::sync::Arc;
///
/// let primary = Arc::new(MapConfigSource::from_pairs([("A", "primary")]));
/// let secondary = Arc::new(MapConfigSource::from_pairs([("A", "secondary"), ("B", "secondary")]));
/// let config = FallbackConfigSource::new(primary, secondary);
///
/// assert_eq!(config.lookup("A").unwrap(), "primary");
/// assert_eq!(config.lookup("B").unwrap(), "secondary");
/// ```
#[derive(Clone)]
pub struct FallbackConfigSource {
    primary: Arc<dyn ConfigSource>,
    secondary: Arc<dyn ConfigSource>,
}

impl FallbackConfigSource {
    /// Create a fallback pair; `primary` is always asked first
    pub fn new(primary: Arc<dyn ConfigSource>, secondary: Arc<dyn ConfigSource>) -> Self {
        Self { primary, secondary }
    }

    /// The source asked first
    pub fn primary(&self) -> &Arc<dyn ConfigSource> {
        &self.primary
    }

    /// The source asked when the primary fails
    pub fn secondary(&self) -> &Arc<dyn ConfigSource> {
        &self.secondary
    }
}

impl ConfigSource for FallbackConfigSource {
    fn name(&self) -> &str {
        "fallback"
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        self.resolve(key).map(|resolved| resolved.value)
    }

    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        match self.primary.resolve(key) {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::debug!(
                        key,
                        primary = self.primary.name(),
                        secondary = self.secondary.name(),
                        error = %e,
                        "primary configuration source failed, falling back"
                    );
                }
                self.secondary.resolve(key)
            }
        }
    }
}

impl std::fmt::Debug for FallbackConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackConfigSource")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .finish()
    }
}

/// Any number of sources tried in order
///
/// Behaves like nested `FallbackConfigSource`s: the first source that
/// resolves a key wins, and if every source fails the last error is returned.
pub struct ChainConfigSource {
    sources: Vec<Arc<dyn ConfigSource>>,
}

impl ChainConfigSource {
    /// Create a chain; at least one source is required
    pub fn new(sources: Vec<Arc<dyn ConfigSource>>) -> ConfigResult<Self> {
        if sources.is_empty() {
            return Err(ConfigError::Other(
                "a configuration chain requires at least one source".to_string(),
            ));
        }
        Ok(Self { sources })
    }

    /// The sources in priority order
    pub fn sources(&self) -> &[Arc<dyn ConfigSource>] {
        &self.sources
    }

    /// Find the first source that resolves `key`
    pub fn find_source(&self, key: &str) -> Option<&Arc<dyn ConfigSource>> {
        self.sources.iter().find(|source| source.contains(key))
    }
}

impl ConfigSource for ChainConfigSource {
    fn name(&self) -> &str {
        "chain"
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        self.resolve(key).map(|resolved| resolved.value)
    }

    fn resolve(&self, key: &str) -> ConfigResult<ResolvedValue> {
        let mut last_error = ConfigError::NotFound(key.to_string());
        for source in &self.sources {
            match source.resolve(key) {
                Ok(resolved) => return Ok(resolved),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

impl std::fmt::Debug for ChainConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfigSource")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
