//! Secret aggregation
//!
//! Turns a list of requested secrets into a `ConfigMap` by fetching them all
//! concurrently from a secret manager client.

mod spec;
mod aggregator;

pub use spec::{SecretSpec, SecretSpecs};
pub use aggregator::{aggregate, fetch_outcome, SecretFetchOutcome, DEFAULT_FETCH_TIMEOUT};
