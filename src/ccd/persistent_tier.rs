//! Tier 2: persistent local KV, backed by `sled`. Survives process restart.
//! Write failures here are logged and tolerated (§4.3.5); the memory tier
//! remains authoritative for the running session.

use crate::error::CoreError;
use crate::key::CacheKey;

pub struct PersistentTier {
    db: sled::Db,
}

impl PersistentTier {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let db = sled::open(path).map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<String>, CoreError> {
        match self.db.get(key.as_str()).map_err(|e| CoreError::StorageFailure(e.to_string()))? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    pub fn put(&self, key: &CacheKey, url: &str) -> Result<(), CoreError> {
        self.db
            .insert(key.as_str(), url.as_bytes())
            .map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.db.clear().map_err(|e| CoreError::StorageFailure(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ReplicateRequest;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile_dir();
        let tier = PersistentTier::open(&dir).unwrap();
        let key = crate::key::derive(&ReplicateRequest::new("https://x/a.jpg".into()), "model");
        tier.put(&key, "https://cdn/a.webp").unwrap();
        assert_eq!(tier.get(&key).unwrap(), Some("https://cdn/a.webp".to_string()));
    }

    #[test]
    fn miss_returns_none() {
        let dir = tempfile_dir();
        let tier = PersistentTier::open(&dir).unwrap();
        let key = crate::key::derive(&ReplicateRequest::new("https://x/a.jpg".into()), "model");
        assert_eq!(tier.get(&key).unwrap(), None);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
        dir.push(format!("facecache-ccd-test-{nanos}-{unique}"));
        dir
    }
}
