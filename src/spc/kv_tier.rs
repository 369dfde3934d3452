//! SPC's fast KV tier: a Redis-like O(1) lookup in front of the durable
//! blob tier (§4.4.2). Eviction is fine here — the blob tier is the source
//! of truth and a KV miss just falls through to a blob `LIST`.

use std::time::Duration;

use moka::future::Cache;

#[derive(Clone)]
pub struct KvTier {
    cache: Cache<String, String>,
}

impl KvTier {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build();
        Self { cache }
    }

    pub async fn get(&self, path: &str) -> Option<String> {
        self.cache.get(path).await
    }

    pub async fn set(&self, path: String, url: String) {
        self.cache.insert(path, url).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let tier = KvTier::new(100, Duration::from_secs(60));
        tier.set("cache/v1/m/abc".to_string(), "https://cdn/abc.webp".to_string()).await;
        assert_eq!(tier.get("cache/v1/m/abc").await, Some("https://cdn/abc.webp".to_string()));
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let tier = KvTier::new(100, Duration::from_secs(60));
        assert_eq!(tier.get("cache/v1/m/missing").await, None);
    }
}
