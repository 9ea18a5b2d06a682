//! Environment variable configuration source

use std::env::{self, VarError};

use super::traits::{path_segments, ConfigError, ConfigResult, ConfigSource};

/// Configuration source that reads process environment variables
///
/// This source is read-only. A key path maps to a variable name by joining
/// its `.`-separated segments with `_`, after an optional prefix:
/// - `DB_PASSWORD` → `DB_PASSWORD`
/// - `database.password` → `database_password`, then `DATABASE_PASSWORD`
///
/// A variable that is set to the empty string resolves to `""`; only unset
/// variables count as not found.
///
/// # Example
///
/// ```
/// use secretlayer_core::config::{ConfigSource, EnvConfigSource};
///
/// let source = EnvConfigSource::new();
/// // source.lookup("DB_PASSWORD") reads $DB_PASSWORD
/// assert_eq!(source.var_name("database.password"), "database_password");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource {
    prefix: Option<String>,
}

impl EnvConfigSource {
    /// Create a source that reads variables by their plain name
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a source that prepends `prefix` to every variable name
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// The variable name a key path maps to
    pub fn var_name(&self, key: &str) -> String {
        let joined = path_segments(key).join("_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, joined),
            None => joined,
        }
    }

    fn read(&self, key: &str, var: &str) -> ConfigResult<Option<String>> {
        match env::var(var) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::invalid_value(
                key,
                format!("environment variable {} is not valid unicode", var),
            )),
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn name(&self) -> &str {
        "env"
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        let var = self.var_name(key);
        if var.is_empty() {
            return Err(ConfigError::NotFound(key.to_string()));
        }

        if let Some(value) = self.read(key, &var)? {
            return Ok(value);
        }

        let upper = var.to_uppercase();
        if upper != var {
            if let Some(value) = self.read(key, &upper)? {
                return Ok(value);
            }
        }

        Err(ConfigError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_name() {
        assert_eq!(EnvConfigSource::new().name(), "env");
    }

    #[test]
    fn test_env_source_direct() {
        env::set_var("SECRETLAYER_TEST_DIRECT", "direct_value");

        let source = EnvConfigSource::new();
        assert_eq!(source.lookup("SECRETLAYER_TEST_DIRECT").unwrap(), "direct_value");

        env::remove_var("SECRETLAYER_TEST_DIRECT");
    }

    #[test]
    fn test_env_source_path() {
        env::set_var("SECRETLAYER_TEST_NESTED_PASSWORD", "nested");

        let source = EnvConfigSource::new();
        assert_eq!(
            source.lookup("secretlayer_test.nested.password").unwrap(),
            "nested"
        );

        env::remove_var("SECRETLAYER_TEST_NESTED_PASSWORD");
    }

    #[test]
    fn test_env_source_prefix() {
        env::set_var("APP_SECRETLAYER_TEST_PREFIXED", "prefixed");

        let source = EnvConfigSource::with_prefix("APP_");
        assert_eq!(source.var_name("SECRETLAYER_TEST_PREFIXED"), "APP_SECRETLAYER_TEST_PREFIXED");
        assert_eq!(source.lookup("SECRETLAYER_TEST_PREFIXED").unwrap(), "prefixed");

        env::remove_var("APP_SECRETLAYER_TEST_PREFIXED");
    }

    #[test]
    fn test_env_source_empty_value_is_found() {
        env::set_var("SECRETLAYER_TEST_EMPTY", "");

        let source = EnvConfigSource::new();
        assert_eq!(source.lookup("SECRETLAYER_TEST_EMPTY").unwrap(), "");
        assert!(source.contains("SECRETLAYER_TEST_EMPTY"));

        env::remove_var("SECRETLAYER_TEST_EMPTY");
    }

    #[test]
    fn test_env_source_not_found() {
        let source = EnvConfigSource::new();
        assert!(source
            .lookup("SECRETLAYER_TEST_NONEXISTENT_XYZ")
            .unwrap_err()
            .is_not_found());
        assert!(source.lookup("").unwrap_err().is_not_found());
    }
}
