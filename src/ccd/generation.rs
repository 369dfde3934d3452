//! Dispatch generations and request ordering (§4.3.4, §5).
//!
//! Every interactive `runEditor` call gets a strictly increasing generation
//! number, reserved at dispatch time, before the inflight leader/waiter
//! split is resolved (§8 "Coalescing") -- `next_sequence` only ever touches
//! the atomic counter, never the shared cancellation slot, so reserving a
//! sequence number can never race with another dispatch's HTTP call.
//!
//! The shared cancellation token, by contrast, must only be superseded once
//! a dispatch is known to actually be driving a new upstream call: calling
//! `supersede_token` is the inflight leader's job alone (see
//! `Ccd::run_editor`), done from inside the `InflightRegistry` closure that
//! only the leader ever runs. A waiter that coalesces onto an
//! already-running computation never calls it, so two concurrent
//! `runEditor` calls on the same cold key can no longer cancel the single
//! upstream request they both depend on. Dispatches that pass
//! `cancel_previous = false` (every prefetch payload) never call it either,
//! so prefetch sweeps never touch this slot and an interactive dispatch can
//! never cancel an unrelated prefetch payload through it.
//!
//! `try_apply` gates whether a completion is allowed to mutate visible
//! state, so a late reply from an older generation is written to cache but
//! never surfaces in the UI.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct Generation {
    counter: Arc<AtomicU64>,
    current_token: Arc<Mutex<CancellationToken>>,
    last_applied: Arc<AtomicU64>,
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

impl Generation {
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            current_token: Arc::new(Mutex::new(CancellationToken::new())),
            last_applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reserves the next ordering sequence number for a dispatch. Safe to
    /// call unconditionally, before inflight leadership for the dispatch's
    /// key is known: it only ever touches the atomic counter.
    pub fn next_sequence(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Cancels whichever token is currently installed and replaces it with a
    /// fresh one, which is returned for the caller's own upstream call.
    /// Must only be called by a dispatch that has already won inflight
    /// leadership for its key (see the module docs above); calling it
    /// earlier would let an unrelated waiter tear down the very computation
    /// it is about to join.
    pub fn supersede_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut guard = self.current_token.lock();
        guard.cancel();
        *guard = token.clone();
        token
    }

    /// Attempts to record `generation` as the most recently applied one.
    /// Returns `false` (and leaves state untouched) if a newer generation
    /// already applied, meaning this completion must not touch visible
    /// state.
    pub fn try_apply(&self, generation: u64) -> bool {
        let mut current = self.last_applied.load(Ordering::SeqCst);
        loop {
            if generation < current {
                return false;
            }
            match self.last_applied.compare_exchange(
                current,
                generation,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supersede_cancels_the_prior_token_only() {
        let generation = Generation::new();
        let first_token = generation.supersede_token();
        assert!(!first_token.is_cancelled());

        let second_token = generation.supersede_token();
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
    }

    #[test]
    fn reserving_a_sequence_number_never_touches_the_token() {
        let generation = Generation::new();
        let token = generation.supersede_token();
        let _ = generation.next_sequence();
        let _ = generation.next_sequence();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn stale_generation_completion_is_rejected() {
        let generation = Generation::new();
        let g1 = generation.next_sequence();
        let g2 = generation.next_sequence();

        assert!(generation.try_apply(g2));
        assert!(!generation.try_apply(g1));
    }

    #[test]
    fn in_order_completions_apply() {
        let generation = Generation::new();
        let g1 = generation.next_sequence();
        let g2 = generation.next_sequence();

        assert!(generation.try_apply(g1));
        assert!(generation.try_apply(g2));
    }
}
