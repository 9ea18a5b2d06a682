//! Map-backed configuration source

use std::collections::HashMap;

use super::config_map::ConfigMap;
use super::traits::{ConfigError, ConfigResult, ConfigSource};

/// Configuration source backed by a fixed `ConfigMap`
///
/// Keys are matched whole; a dotted key is not split into a path. Anything
/// not in the map is reported as not found, with no implicit fallback.
#[derive(Debug, Clone)]
pub struct MapConfigSource {
    name: String,
    map: ConfigMap,
}

impl MapConfigSource {
    /// Wrap an existing map
    pub fn new(map: ConfigMap) -> Self {
        Self::with_name("map", map)
    }

    /// Wrap a map under a custom source name
    pub fn with_name(name: impl Into<String>, map: ConfigMap) -> Self {
        Self {
            name: name.into(),
            map,
        }
    }

    /// Build a source from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(ConfigMap::from_pairs(pairs))
    }

    /// Build a source from a `HashMap`
    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self::new(map.into())
    }

    /// The backing map
    pub fn map(&self) -> &ConfigMap {
        &self.map
    }
}

impl ConfigSource for MapConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        self.map
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source_lookup() {
        let source = MapConfigSource::from_pairs([("DB_PASSWORD", "s3cr3t")]);
        assert_eq!(source.name(), "map");
        assert_eq!(source.lookup("DB_PASSWORD").unwrap(), "s3cr3t");
        assert!(source.lookup("OTHER").unwrap_err().is_not_found());
    }

    #[test]
    fn test_map_source_whole_key_match() {
        let source = MapConfigSource::from_pairs([("database.password", "s3cr3t")]);
        assert_eq!(source.lookup("database.password").unwrap(), "s3cr3t");
        assert!(source.lookup("database").unwrap_err().is_not_found());
    }

    #[test]
    fn test_map_source_with_name() {
        let source = MapConfigSource::with_name("secret-manager", ConfigMap::default());
        assert_eq!(source.name(), "secret-manager");
        assert!(source.map().is_empty());
    }

    #[test]
    fn test_map_source_from_map() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), "v".to_string());
        let source = MapConfigSource::from_map(map);
        assert!(source.contains("k"));
    }
}
