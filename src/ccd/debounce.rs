//! Trailing debounce for control-change → focused-sweep scheduling (§4.3.4,
//! §9 "Debounced/throttled scheduling").
//!
//! Modeled as a single-slot pending timer swapped atomically on each
//! reschedule, per the redesign note: the previous timer is never removed
//! from a queue, its [`CancellationToken`] is just flipped so its delayed
//! task becomes a no-op when it eventually wakes. `arc-swap` holds the
//! current slot so `schedule` never blocks behind a running sweep.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

/// Schedules a unit of work (the focused sweep) after a trailing quiet
/// period. Calling [`Debouncer::schedule`] again before the delay elapses
/// cancels the pending timer and starts a fresh one; only the last call in
/// a burst ever fires.
pub struct Debouncer {
    delay: Duration,
    pending: ArcSwap<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: ArcSwap::from_pointee(CancellationToken::new()) }
    }

    /// Replaces whatever timer is currently pending with a new one and
    /// spawns a task that runs `work` after `delay`, unless cancelled first.
    pub fn schedule<F, Fut>(&self, work: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let token = Arc::new(CancellationToken::new());
        let previous = self.pending.swap(token.clone());
        previous.cancel();

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => work().await,
                _ = token.cancelled() => {}
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn rapid_reschedules_coalesce_to_one_firing() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let fired = fired.clone();
            debouncer.schedule(move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::advance(Duration::from_millis(10)).await;
        }

        tokio::time::advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn an_uninterrupted_schedule_fires_once() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_clone = fired.clone();
        debouncer.schedule(move || async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::advance(Duration::from_millis(30)).await;
        tokio::task::yield_now().await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
