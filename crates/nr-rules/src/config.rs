use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a cached evaluation stays valid unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1000);

/// Configuration for an [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Result cache time-to-live in milliseconds. 0 disables caching.
    pub cache_ttl_ms: u64,
    /// Maximum cached fingerprints (oldest evicted first). 0 = unlimited.
    pub max_cache_entries: usize,
    /// Install the tracing observer when no observer is given explicitly.
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 1000,
            max_cache_entries: 0,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Set the result cache time-to-live.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the maximum number of cached fingerprints (0 = unlimited).
    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }

    /// Enable or disable debug logging through `tracing`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The result cache time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl(), DEFAULT_CACHE_TTL);
        assert_eq!(config.max_cache_entries, 0);
        assert!(!config.debug);
    }

    #[test]
    fn config_builder_chain() {
        let config = EngineConfig::default()
            .with_cache_ttl(Duration::from_millis(250))
            .with_max_cache_entries(64)
            .with_debug(true);
        assert_eq!(config.cache_ttl_ms, 250);
        assert_eq!(config.max_cache_entries, 64);
        assert!(config.debug);
    }

    #[test]
    fn config_from_partial_json() {
        let config: EngineConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.cache_ttl_ms, 1000);
    }
}
