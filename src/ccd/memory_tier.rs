//! Tier 1: in-memory cache. Authoritative for the current process session;
//! lost on restart, which is what tier 2 is for.

use dashmap::DashMap;

use crate::key::CacheKey;

#[derive(Default)]
pub struct MemoryTier {
    map: DashMap<CacheKey, String>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self { map: DashMap::new() }
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.map.get(key).map(|entry| entry.clone())
    }

    pub fn put(&self, key: CacheKey, url: String) {
        self.map.insert(key, url);
    }

    pub fn clear(&self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ReplicateRequest;

    #[test]
    fn put_then_get_round_trips() {
        let tier = MemoryTier::new();
        let key = crate::key::derive(&ReplicateRequest::new("https://x/a.jpg".into()), "model");
        tier.put(key.clone(), "https://cdn/a.webp".to_string());
        assert_eq!(tier.get(&key), Some("https://cdn/a.webp".to_string()));
    }

    #[test]
    fn miss_returns_none() {
        let tier = MemoryTier::new();
        let key = crate::key::derive(&ReplicateRequest::new("https://x/a.jpg".into()), "model");
        assert_eq!(tier.get(&key), None);
    }
}
