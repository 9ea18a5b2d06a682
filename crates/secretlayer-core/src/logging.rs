//! Tracing subscriber setup
//!
//! The library itself only emits `tracing` events; applications that do not
//! install their own subscriber can call `init_tracing`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive for this crate
pub const LOG_ENV: &str = "SECRETLAYER_LOG";

const DEFAULT_FILTER: &str = "info";

/// The filter directive in effect
///
/// Checks `SECRETLAYER_LOG`, then `RUST_LOG`, then defaults to `info`.
pub fn log_filter() -> String {
    select_filter(std::env::var(LOG_ENV).ok(), std::env::var("RUST_LOG").ok())
}

fn select_filter(crate_filter: Option<String>, rust_log: Option<String>) -> String {
    [crate_filter, rust_log]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a compact fmt subscriber filtered by `log_filter`
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_new(log_filter()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_filter_order() {
        let filter = select_filter(Some("secretlayer_core=debug".into()), Some("warn".into()));
        assert_eq!(filter, "secretlayer_core=debug");

        assert_eq!(select_filter(None, Some("warn".into())), "warn");
        assert_eq!(select_filter(Some("  ".into()), Some("warn".into())), "warn");
        assert_eq!(select_filter(None, None), "info");
    }
}
