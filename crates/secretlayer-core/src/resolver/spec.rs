//! Requested secrets and their configuration keys

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};

/// One secret to fetch
///
/// Either a bare name, used both as the secret manager name and as the
/// configuration key, or a `{ name, key }` pair that renames it.
///
/// Deserializes from either form:
///
/// ```yaml
/// secrets:
///   - DB_PASSWORD
///   - name: api-key
///     key: API_KEY
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretSpec {
    /// Same name in the store and in configuration
    Name(String),
    /// Store name `name`, exposed as configuration key `key`
    Renamed { name: String, key: String },
}

impl SecretSpec {
    /// A spec whose store name and configuration key are the same
    pub fn name(name: impl Into<String>) -> Self {
        SecretSpec::Name(name.into())
    }

    /// A spec that reads `name` from the store and exposes it as `key`
    pub fn renamed(name: impl Into<String>, key: impl Into<String>) -> Self {
        SecretSpec::Renamed {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Name of the secret in the secret manager
    pub fn external_name(&self) -> &str {
        match self {
            SecretSpec::Name(name) => name,
            SecretSpec::Renamed { name, .. } => name,
        }
    }

    /// Key the value is exposed under
    pub fn config_key(&self) -> &str {
        match self {
            SecretSpec::Name(name) => name,
            SecretSpec::Renamed { key, .. } => key,
        }
    }
}

impl From<&str> for SecretSpec {
    fn from(name: &str) -> Self {
        SecretSpec::name(name)
    }
}

impl From<String> for SecretSpec {
    fn from(name: String) -> Self {
        SecretSpec::Name(name)
    }
}

impl From<(&str, &str)> for SecretSpec {
    fn from((name, key): (&str, &str)) -> Self {
        SecretSpec::renamed(name, key)
    }
}

/// A validated, non-empty list of secrets with unique configuration keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SecretSpecs {
    specs: Vec<SecretSpec>,
}

impl SecretSpecs {
    /// Validate a list of specs
    ///
    /// Fails with `EmptySecrets` when the list is empty, with `DuplicateKey`
    /// when two specs expose the same configuration key, and with
    /// `InvalidValue` when a name or key is blank.
    pub fn new(specs: Vec<SecretSpec>) -> ConfigResult<Self> {
        if specs.is_empty() {
            return Err(ConfigError::EmptySecrets);
        }

        {
            let mut seen = HashSet::new();
            for spec in &specs {
                if spec.external_name().trim().is_empty() {
                    return Err(ConfigError::invalid_value(
                        spec.config_key(),
                        "secret name is empty",
                    ));
                }
                if spec.config_key().trim().is_empty() {
                    return Err(ConfigError::invalid_value(
                        spec.external_name(),
                        "configuration key is empty",
                    ));
                }
                if !seen.insert(spec.config_key()) {
                    return Err(ConfigError::DuplicateKey(spec.config_key().to_string()));
                }
            }
        }

        Ok(Self { specs })
    }

    /// Validate any iterator of things convertible into specs
    pub fn try_from_iter<I, S>(specs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SecretSpec>,
    {
        Self::new(specs.into_iter().map(Into::into).collect())
    }

    /// Number of specs; never zero
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SecretSpec> {
        self.specs.iter()
    }

    pub fn as_slice(&self) -> &[SecretSpec] {
        &self.specs
    }
}

impl<'a> IntoIterator for &'a SecretSpecs {
    type Item = &'a SecretSpec;
    type IntoIter = std::slice::Iter<'a, SecretSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl<'de> Deserialize<'de> for SecretSpecs {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let specs = Vec::<SecretSpec>::deserialize(deserializer)?;
        SecretSpecs::new(specs).map_err(serde::de::Error::custom)
    }
}
