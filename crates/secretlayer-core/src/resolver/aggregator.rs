//! Concurrent secret fetching with per-secret failure tolerance

use std::time::Duration;

use futures::future::join_all;

use crate::config::ConfigMap;
use crate::secrets::{SecretManagerClient, SecretManagerError};

use super::spec::{SecretSpec, SecretSpecs};

/// Per-fetch timeout used when callers do not choose one
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of fetching one secret
///
/// A failed fetch is data, not an error: it becomes `Absent` and the key is
/// simply missing from the aggregated map.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretFetchOutcome {
    /// The secret was read
    Present { key: String, value: String },
    /// The secret is missing or could not be read
    Absent { key: String },
}

impl SecretFetchOutcome {
    /// Configuration key this outcome belongs to
    pub fn key(&self) -> &str {
        match self {
            SecretFetchOutcome::Present { key, .. } => key,
            SecretFetchOutcome::Absent { key } => key,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SecretFetchOutcome::Present { .. })
    }

    /// The key/value pair, if the secret was read
    pub fn into_entry(self) -> Option<(String, String)> {
        match self {
            SecretFetchOutcome::Present { key, value } => Some((key, value)),
            SecretFetchOutcome::Absent { .. } => None,
        }
    }
}

impl std::fmt::Debug for SecretFetchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretFetchOutcome::Present { key, .. } => {
                f.debug_struct("Present").field("key", key).finish_non_exhaustive()
            }
            SecretFetchOutcome::Absent { key } => f.debug_struct("Absent").field("key", key).finish(),
        }
    }
}

/// Fetch one secret, converting every failure into `Absent`
pub async fn fetch_outcome(
    client: &dyn SecretManagerClient,
    spec: &SecretSpec,
    fetch_timeout: Duration,
) -> SecretFetchOutcome {
    let name = spec.external_name();
    let key = spec.config_key().to_string();

    let result = match tokio::time::timeout(fetch_timeout, client.access_secret_version(name)).await
    {
        Ok(result) => result,
        Err(_) => Err(SecretManagerError::Timeout(name.to_string())),
    };

    match result {
        Ok(value) => {
            tracing::debug!(secret = name, key = %key, "fetched secret");
            SecretFetchOutcome::Present { key, value }
        }
        Err(e) => {
            if e.is_not_found() {
                tracing::warn!(secret = name, key = %key, "secret not found, leaving key unset");
            } else {
                tracing::warn!(secret = name, key = %key, error = %e, "failed to fetch secret, leaving key unset");
            }
            SecretFetchOutcome::Absent { key }
        }
    }
}

/// Fetch every requested secret concurrently and layer the results on `seed`
///
/// All fetches are started at once and the call returns only after each has
/// settled. Failures never abort the others or the aggregation; a failed
/// secret is just absent from the result, so if every fetch fails the result
/// equals `seed`. Fetched values replace seed values with the same key.
///
/// Dropping the returned future cancels every in-flight fetch.
pub async fn aggregate(
    seed: &ConfigMap,
    specs: &SecretSpecs,
    client: &dyn SecretManagerClient,
    fetch_timeout: Duration,
) -> ConfigMap {
    let outcomes = join_all(
        specs
            .iter()
            .map(|spec| fetch_outcome(client, spec, fetch_timeout)),
    )
    .await;

    let requested = outcomes.len();
    let fetched: Vec<(String, String)> = outcomes
        .into_iter()
        .filter_map(SecretFetchOutcome::into_entry)
        .collect();

    tracing::info!(
        project_id = client.project_id(),
        requested,
        fetched = fetched.len(),
        seeded = seed.len(),
        "aggregated secrets"
    );

    seed.merged_with(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{MemorySecretManager, SecretManagerConnector};
    use std::sync::Arc;

    async fn client(manager: &MemorySecretManager) -> Arc<dyn SecretManagerClient> {
        manager.open("proj").await.unwrap()
    }

    #[tokio::test]
    async fn test_aggregate_single_secret() {
        let manager = MemorySecretManager::new();
        manager.insert("DB_PASSWORD", "s3cr3t");

        let specs = SecretSpecs::try_from_iter(["DB_PASSWORD"]).unwrap();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;

        assert_eq!(map.get("DB_PASSWORD"), Some("s3cr3t"));
        assert_eq!(map.len(), 1);
    }

    #[tokio::test]
    async fn test_aggregate_tolerates_missing() {
        let manager = MemorySecretManager::new();
        manager.insert("PRESENT", "ok");

        let specs = SecretSpecs::try_from_iter(["MISSING", "PRESENT"]).unwrap();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;

        assert_eq!(map, ConfigMap::from_pairs([("PRESENT", "ok")]));
    }

    #[tokio::test]
    async fn test_aggregate_tolerates_errors() {
        let manager = MemorySecretManager::new();
        manager.insert("A", "1");
        manager.insert("B", "2");
        manager.fail_secret("B", "permission denied");

        let specs = SecretSpecs::try_from_iter(["A", "B"]).unwrap();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;

        assert_eq!(map.get("A"), Some("1"));
        assert!(!map.contains_key("B"));
    }

    #[tokio::test]
    async fn test_aggregate_all_fail_returns_seed() {
        let manager = MemorySecretManager::new();
        let seed = ConfigMap::from_pairs([("HOST", "localhost")]);

        let specs = SecretSpecs::try_from_iter(["X", "Y"]).unwrap();
        let map = aggregate(&seed, &specs, client(&manager).await.as_ref(), DEFAULT_FETCH_TIMEOUT).await;

        assert_eq!(map, seed);
    }

    #[tokio::test]
    async fn test_aggregate_renamed() {
        let manager = MemorySecretManager::new();
        manager.insert("api-key", "xyz");

        let specs = SecretSpecs::try_from_iter([("api-key", "API_KEY")]).unwrap();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;

        assert_eq!(map, ConfigMap::from_pairs([("API_KEY", "xyz")]));
    }

    #[tokio::test]
    async fn test_aggregate_overrides_seed() {
        let manager = MemorySecretManager::new();
        manager.insert("PORT", "6543");

        let seed = ConfigMap::from_pairs([("HOST", "localhost"), ("PORT", "5432")]);
        let specs = SecretSpecs::try_from_iter(["PORT"]).unwrap();
        let map = aggregate(&seed, &specs, client(&manager).await.as_ref(), DEFAULT_FETCH_TIMEOUT).await;

        assert_eq!(map.get("HOST"), Some("localhost"));
        assert_eq!(map.get("PORT"), Some("6543"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregate_fetches_concurrently() {
        let manager = MemorySecretManager::new();
        for name in ["A", "B", "C"] {
            manager.insert(name, name);
            manager.delay_secret(name, Duration::from_secs(5));
        }

        let specs = SecretSpecs::try_from_iter(["A", "B", "C"]).unwrap();
        let started = tokio::time::Instant::now();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            Duration::from_secs(60),
        )
        .await;

        assert_eq!(map.len(), 3);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregate_times_out_slow_fetch() {
        let manager = MemorySecretManager::new();
        manager.insert("FAST", "1");
        manager.insert("SLOW", "2");
        manager.delay_secret("SLOW", Duration::from_secs(300));

        let specs = SecretSpecs::try_from_iter(["FAST", "SLOW"]).unwrap();
        let started = tokio::time::Instant::now();
        let map = aggregate(
            ConfigMap::empty_seed(),
            &specs,
            client(&manager).await.as_ref(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(map, ConfigMap::from_pairs([("FAST", "1")]));
        assert!(started.elapsed() < Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_fetch_outcome() {
        let manager = MemorySecretManager::new();
        manager.insert("api-key", "xyz");
        let client = client(&manager).await;

        let outcome = fetch_outcome(
            client.as_ref(),
            &SecretSpec::renamed("api-key", "API_KEY"),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;
        assert!(outcome.is_present());
        assert_eq!(outcome.key(), "API_KEY");
        assert!(!format!("{:?}", outcome).contains("xyz"));

        let outcome =
            fetch_outcome(client.as_ref(), &SecretSpec::name("nope"), DEFAULT_FETCH_TIMEOUT).await;
        assert_eq!(outcome, SecretFetchOutcome::Absent { key: "nope".to_string() });
        assert_eq!(outcome.into_entry(), None);
    }
}
