//! Secret manager clients
//!
//! This module provides the connection to the remote secret store:
//! - `SecretManagerConnector` / `SecretManagerClient` traits for opening a
//!   project-scoped connection and fetching the latest version of a secret
//! - Built-in implementations: `HttpSecretManager` (REST API) and
//!   `MemorySecretManager` (in-process, for tests and local runs)
//! - `ClientHandle`, which closes a client exactly once when its scope ends

mod traits;
mod http_client;
mod memory_client;
mod handle;

pub use traits::{
    secret_version_name, SecretManagerClient, SecretManagerConnector, SecretManagerError,
    SecretManagerResult,
};
pub use http_client::{HttpSecretClient, HttpSecretManager, HttpSecretManagerConfig, ACCESS_TOKEN_ENV};
pub use memory_client::{MemorySecretClient, MemorySecretManager};
pub use handle::ClientHandle;
