//! Secret-backed configuration providers and their scopes
//!
//! Three ways to compose a provider, all fetching the same secrets:
//! - `SecretConfigLayer::secrets_only`: fetched secrets, nothing else
//! - `SecretConfigLayer::with_env_fallback`: then environment variables
//! - `SecretConfigLayer::with_json_fallback`: then a JSON document
//!
//! A built provider is a `ScopedConfig` that keeps the secret manager client
//! open until the scope ends. Code running inside `SecretConfigLayer::scoped`
//! or `ScopedConfig::run` can reach the provider through `current_config`.

mod options;
mod compose;
mod scope;

pub use options::SecretProviderOptions;
pub use compose::{compose_source, secrets_source, Fallback, SecretConfigLayer, SECRET_SOURCE_NAME};
pub use scope::{current_config, with_config, ScopedConfig};
