//! Options describing which secrets a provider fetches

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigMap, ConfigResult};
use crate::resolver::{SecretSpec, SecretSpecs};

fn default_fetch_timeout_ms() -> u64 {
    10_000 // 10 seconds
}

/// Settings for a secret-backed configuration provider
///
/// Usually built in code, but can also be loaded from YAML or JSON:
///
/// ```yaml
/// project_id: my-project
/// fetch_timeout_ms: 5000
/// secrets:
///   - DB_PASSWORD
///   - name: api-key
///     key: API_KEY
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretProviderOptions {
    /// Project the secrets live in
    pub project_id: String,

    /// Secrets to fetch; validated non-empty with unique keys
    pub secrets: SecretSpecs,

    /// Timeout for each secret fetch in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Values known before any secret is fetched; fetched values win
    #[serde(default, skip_serializing)]
    pub seed: Option<ConfigMap>,
}

impl SecretProviderOptions {
    /// Create options for `project_id` with already-validated specs
    pub fn new(project_id: impl Into<String>, secrets: SecretSpecs) -> Self {
        Self {
            project_id: project_id.into(),
            secrets,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            seed: None,
        }
    }

    /// Create options, validating the secret list
    ///
    /// # Example
    ///
    /// ```
    /// use secretlayer_core::layer::SecretProviderOptions;
    /// use secretlayer_core::resolver::SecretSpec;
    ///
    /// let options = SecretProviderOptions::try_new(
    ///     "my-project",
    ///     [SecretSpec::name("DB_PASSWORD"), SecretSpec::renamed("api-key", "API_KEY")],
    /// )
    /// .unwrap();
    /// assert_eq!(options.secrets.len(), 2);
    /// ```
    pub fn try_new<I, S>(project_id: impl Into<String>, secrets: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SecretSpec>,
    {
        Ok(Self::new(project_id, SecretSpecs::try_from_iter(secrets)?))
    }

    /// Replace the default (empty) seed for this provider
    pub fn with_seed(mut self, seed: ConfigMap) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the per-fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// The seed map, falling back to the shared empty default
    pub fn seed(&self) -> &ConfigMap {
        self.seed.as_ref().unwrap_or(ConfigMap::empty_seed())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Check the parts serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::invalid_value("project_id", "must not be empty"));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "fetch_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse options from YAML text
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let options: Self = serde_yaml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse options from JSON text
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }
}
