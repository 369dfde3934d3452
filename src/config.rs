//! Process-wide configuration constants (§6), loaded once at startup and
//! shared behind an `Arc` rather than reached for as a singleton.
//!
//! Every field has the declared default from the specification's
//! configuration table; `envy` lets an operator override any of them via
//! environment variables (`NUM_BUCKETS`, `MAX_CONCURRENT_REQUESTS`, ...)
//! without touching code.

use std::sync::Arc;

use serde::Deserialize;

fn default_num_buckets() -> u32 {
    6
}

fn default_max_concurrent_requests() -> usize {
    250
}

fn default_loading_delay_ms() -> u64 {
    120
}

fn default_cache_version() -> String {
    "v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_model_max_retries() -> u32 {
    3
}

fn default_model_initial_backoff_ms() -> u64 {
    100
}

fn default_model_id() -> String {
    "face-expression-v1".to_string()
}

fn default_sled_path() -> String {
    "ccd-cache.sled".to_string()
}

fn default_blob_root() -> String {
    "spc-blobs".to_string()
}

fn default_blob_public_base_url() -> String {
    "http://localhost:8080/blobs".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_num_buckets")]
    pub num_buckets: u32,

    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_loading_delay_ms")]
    pub loading_delay_ms: u64,

    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    #[serde(default = "default_model_max_retries")]
    pub model_max_retries: u32,

    #[serde(default = "default_model_initial_backoff_ms")]
    pub model_initial_backoff_ms: u64,

    /// Folded into every cache key (§9) so that two deployments serving
    /// different models never share a cache entry.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Path to the CCD's persistent local KV tier (tier 2).
    #[serde(default = "default_sled_path")]
    pub sled_path: String,

    /// Filesystem root for the SPC durable blob tier.
    #[serde(default = "default_blob_root")]
    pub blob_root: String,

    /// Base URL artifacts are served from once persisted.
    #[serde(default = "default_blob_public_base_url")]
    pub blob_public_base_url: String,
}

impl Config {
    /// Loads configuration from the environment, falling back to the
    /// defaults declared above for anything unset.
    pub fn from_env() -> anyhow::Result<Arc<Self>> {
        Ok(Arc::new(envy::from_env::<Config>()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_buckets: default_num_buckets(),
            max_concurrent_requests: default_max_concurrent_requests(),
            loading_delay_ms: default_loading_delay_ms(),
            cache_version: default_cache_version(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            model_max_retries: default_model_max_retries(),
            model_initial_backoff_ms: default_model_initial_backoff_ms(),
            model_id: default_model_id(),
            sled_path: default_sled_path(),
            blob_root: default_blob_root(),
            blob_public_base_url: default_blob_public_base_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_declared_constants() {
        let config = Config::default();
        assert_eq!(config.num_buckets, 6);
        assert_eq!(config.max_concurrent_requests, 250);
        assert_eq!(config.loading_delay_ms, 120);
        assert_eq!(config.cache_version, "v1");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.max_poll_attempts, 30);
        assert_eq!(config.model_max_retries, 3);
        assert_eq!(config.model_initial_backoff_ms, 100);
    }
}
