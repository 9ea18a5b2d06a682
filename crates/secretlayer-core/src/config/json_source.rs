//! JSON document configuration source

use serde_json::Value;

use super::traits::{path_segments, ConfigError, ConfigResult, ConfigSource};

/// A JSON document supplied either as parsed data or as text
#[derive(Debug, Clone)]
pub enum JsonDocument {
    /// Already-structured data
    Value(Value),
    /// Raw JSON text, parsed when the document is used
    Text(String),
}

impl JsonDocument {
    /// Parse the document if needed
    ///
    /// Malformed text is a `ConfigError::Json`.
    pub fn into_value(self) -> ConfigResult<Value> {
        match self {
            JsonDocument::Value(value) => Ok(value),
            JsonDocument::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

impl From<Value> for JsonDocument {
    fn from(value: Value) -> Self {
        JsonDocument::Value(value)
    }
}

impl From<String> for JsonDocument {
    fn from(text: String) -> Self {
        JsonDocument::Text(text)
    }
}

impl From<&str> for JsonDocument {
    fn from(text: &str) -> Self {
        JsonDocument::Text(text.to_string())
    }
}

/// Configuration source backed by a parsed JSON document
///
/// A key is first matched as a literal top-level field, then as a
/// `.`-separated path through nested objects (numeric segments index into
/// arrays). Strings are returned as-is, numbers and booleans are rendered as
/// text. `null` counts as not found; objects and arrays are invalid values.
///
/// # Example
///
/// ```
/// use secretlayer_core::config::{ConfigSource, JsonConfigSource};
///
/// let source = JsonConfigSource::from_str(r#"{"database": {"port": 5432}}"#).unwrap();
/// assert_eq!(source.lookup("database.port").unwrap(), "5432");
/// ```
#[derive(Debug, Clone)]
pub struct JsonConfigSource {
    root: Value,
}

impl JsonConfigSource {
    /// Wrap an already-parsed document
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a document from text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> ConfigResult<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// Build a source from a document, parsing it if it is text
    pub fn from_document(document: JsonDocument) -> ConfigResult<Self> {
        document.into_value().map(Self::new)
    }

    /// The parsed document
    pub fn root(&self) -> &Value {
        &self.root
    }

    fn find(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.root.get(key) {
            return Some(value);
        }

        let segments = path_segments(key);
        if segments.is_empty() {
            return None;
        }

        let mut current = &self.root;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl ConfigSource for JsonConfigSource {
    fn name(&self) -> &str {
        "json"
    }

    fn lookup(&self, key: &str) -> ConfigResult<String> {
        match self.find(key) {
            None | Some(Value::Null) => Err(ConfigError::NotFound(key.to_string())),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Object(_)) | Some(Value::Array(_)) => Err(ConfigError::invalid_value(
                key,
                "expected a scalar, found a nested structure",
            )),
        }
    }
}
