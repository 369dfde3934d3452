//! Request coalescing: at most one upstream computation per key per process.
//!
//! Generalized from the idempotency-key handling pattern (in-flight entry +
//! `Notify`-based waiters, entry removed on completion) to an arbitrary
//! key/value/error triple, since here the key is a [`crate::key::CacheKey`]
//! rather than an HTTP idempotency header, and the same registry instance
//! backs both the interactive `runEditor` path and prefetch sweeps so that
//! a sweep payload and a concurrent ad-hoc edit to the same point share one
//! computation.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry as DashEntry;
use dashmap::DashMap;
use tokio::sync::Notify;

struct Shared<V, E> {
    notify: Notify,
    result: std::sync::Mutex<Option<Result<V, E>>>,
}

impl<V, E> Shared<V, E> {
    fn new() -> Self {
        Self { notify: Notify::new(), result: std::sync::Mutex::new(None) }
    }
}

/// Coalesces concurrent callers computing the same key onto a single
/// in-flight computation.
pub struct InflightRegistry<K, V, E> {
    store: DashMap<K, Arc<Shared<V, E>>>,
}

impl<K, V, E> Default for InflightRegistry<K, V, E>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> InflightRegistry<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self { store: DashMap::new() }
    }

    /// Number of computations currently in flight. Used by tests to assert
    /// the registry drains back to empty after completion.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Runs `compute` for `key`, or joins an already-running computation for
    /// the same key. Exactly one `compute` call executes per key at a time;
    /// every other caller observes its result once it resolves.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let (shared, is_leader) = match self.store.entry(key.clone()) {
            DashEntry::Occupied(entry) => (entry.get().clone(), false),
            DashEntry::Vacant(entry) => {
                let shared = Arc::new(Shared::new());
                entry.insert(shared.clone());
                (shared, true)
            }
        };

        if !is_leader {
            return Self::wait(shared).await;
        }

        let result = compute().await;
        *shared.result.lock().unwrap() = Some(result.clone());
        self.store.remove(&key);
        shared.notify.notify_waiters();
        result
    }

    async fn wait(shared: Arc<Shared<V, E>>) -> Result<V, E> {
        loop {
            if let Some(result) = shared.result.lock().unwrap().clone() {
                return result;
            }

            let notified = shared.notify.notified();

            // Re-check after registering interest: closes the race where the
            // leader finished and called `notify_waiters` between our two
            // lock acquisitions above.
            if let Some(result) = shared.result.lock().unwrap().clone() {
                return result;
            }

            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_coalesce_onto_one_computation() {
        let registry: Arc<InflightRegistry<&'static str, u32, String>> = Arc::new(InflightRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .get_or_compute("key", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn failures_propagate_to_all_waiters_and_clear_the_entry() {
        let registry: InflightRegistry<&'static str, u32, String> = InflightRegistry::new();
        let result = registry.get_or_compute("key", || async { Err::<u32, _>("boom".to_string()) }).await;
        assert_eq!(result, Err("boom".to_string()));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let registry: InflightRegistry<&'static str, u32, String> = InflightRegistry::new();
        let a = registry.get_or_compute("a", || async { Ok::<_, String>(1) }).await;
        let b = registry.get_or_compute("b", || async { Ok::<_, String>(2) }).await;
        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(2));
    }
}
