//! Configuration sources
//!
//! Supports multiple sources behind one `ConfigSource` trait:
//! - `MapConfigSource`: A fixed `ConfigMap`, typically secret-derived
//! - `EnvConfigSource`: Process environment variables
//! - `JsonConfigSource`: A caller-supplied JSON document
//! - `FallbackConfigSource` / `ChainConfigSource`: Ordered fallback

mod traits;
mod config_map;
mod map_source;
mod env_source;
mod json_source;
mod fallback;

pub use traits::{ConfigError, ConfigResult, ConfigSource, ConfigSourceExt, ResolvedValue};
pub use config_map::ConfigMap;
pub use map_source::MapConfigSource;
pub use env_source::EnvConfigSource;
pub use json_source::{JsonConfigSource, JsonDocument};
pub use fallback::{ChainConfigSource, FallbackConfigSource};
