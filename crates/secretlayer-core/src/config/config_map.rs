//! Immutable key/value map produced by secret aggregation

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

/// Default seed: no values known before secrets are fetched
static EMPTY_SEED: Lazy<ConfigMap> = Lazy::new(ConfigMap::default);

/// Immutable mapping from configuration key to value
///
/// Keys are kept sorted so iteration order is deterministic. Values are
/// treated as confidential: `Debug` prints keys only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: BTreeMap<String, String>,
}

impl ConfigMap {
    /// The process-wide default seed, which is empty
    ///
    /// Callers that know values up front pass their own map instead; this
    /// one is never mutated.
    pub fn empty_seed() -> &'static ConfigMap {
        &EMPTY_SEED
    }

    /// Build a map from key/value pairs; later pairs win on duplicate keys
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Check if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Produce a new map with `overrides` layered on top of `self`
    ///
    /// Keys present in both take the value from `overrides`; keys only in
    /// `self` are kept as they are.
    pub fn merged_with<I>(&self, overrides: I) -> ConfigMap
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = self.entries.clone();
        entries.extend(overrides);
        ConfigMap { entries }
    }
}

impl From<HashMap<String, String>> for ConfigMap {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for ConfigMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<'de> serde::Deserialize<'de> for ConfigMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, String>::deserialize(deserializer).map(ConfigMap::from)
    }
}

// Values are secret; only show which keys are present
impl std::fmt::Debug for ConfigMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMap")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
