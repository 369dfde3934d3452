//! `runEditor`: the CCD's single entry point for both interactive edits and
//! prefetch sweeps (§4.3.2).
//!
//! Lookup order is tier 1 (memory) → tier 2 (persistent local KV) → tier 3
//! (SPC over HTTP), short-circuiting on the first hit and back-filling the
//! lower tiers. A miss registers an in-flight computation shared by every
//! waiter racing on the same cache key, including prefetch payloads that
//! happen to coincide with an ad-hoc edit.
//!
//! The ordering sequence number is reserved up front, but the shared
//! cancellation token is only superseded from inside the inflight closure,
//! which only the dispatch that wins leadership for this key ever runs (see
//! `Generation`'s module docs). That keeps a waiter coalescing onto an
//! already-running computation from cancelling the very HTTP call it is
//! about to share, and keeps non-cancelling dispatches (every prefetch
//! payload) from ever touching the slot at all.

use std::sync::Arc;

use crate::config::Config;
use crate::contracts::ReplicateRequest;
use crate::error::CoreError;
use crate::inflight::InflightRegistry;
use crate::key::{self, CacheKey};
use crate::quantize;

use super::client::SpcClient;
use super::generation::Generation;
use super::memory_tier::MemoryTier;
use super::persistent_tier::PersistentTier;

/// Options controlling one `runEditor` dispatch.
#[derive(Debug, Clone, Copy)]
pub struct RunEditorOptions {
    /// Cancels the token belonging to whichever dispatch preceded this one.
    /// Prefetch sweeps always pass `false` so they never starve the
    /// interactive path (and vice versa).
    pub cancel_previous: bool,
    /// Bypasses tier 1 / tier 2 lookups, forcing an upstream round trip.
    pub skip_cache: bool,
}

impl Default for RunEditorOptions {
    fn default() -> Self {
        Self { cancel_previous: true, skip_cache: false }
    }
}

pub struct RunEditorOutcome {
    pub url: String,
    /// `false` when this completion lost the ordering race (§4.3.4) and was
    /// persisted to cache but must not be surfaced to the UI.
    pub applied: bool,
}

pub struct Ccd {
    memory: MemoryTier,
    persistent: PersistentTier,
    client: SpcClient,
    inflight: InflightRegistry<CacheKey, String, CoreError>,
    generation: Generation,
    config: Arc<Config>,
}

impl Ccd {
    pub fn new(
        memory: MemoryTier,
        persistent: PersistentTier,
        client: SpcClient,
        config: Arc<Config>,
    ) -> Self {
        Self {
            memory,
            persistent,
            client,
            inflight: InflightRegistry::new(),
            generation: Generation::new(),
            config,
        }
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub async fn run_editor(
        &self,
        params: ReplicateRequest,
        options: RunEditorOptions,
    ) -> Result<RunEditorOutcome, CoreError> {
        let quantized = quantize::quantize(&params, self.config.num_buckets)?;
        let cache_key = key::derive(&quantized, &self.config.model_id);

        if !options.skip_cache {
            if let Some(url) = self.memory.get(&cache_key) {
                tracing::debug!(key = %cache_key, "ccd memory tier hit");
                return Ok(RunEditorOutcome { url, applied: true });
            }

            match self.persistent.get(&cache_key) {
                Ok(Some(url)) => {
                    self.memory.put(cache_key.clone(), url.clone());
                    tracing::debug!(key = %cache_key, "ccd persistent tier hit");
                    return Ok(RunEditorOutcome { url, applied: true });
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(%err, "ccd persistent tier read failed"),
            }
        }

        // Reserved unconditionally, before leadership for this key is known:
        // `next_sequence` only touches the atomic counter, so it can never
        // race with another dispatch's in-flight HTTP call.
        let sequence = self.generation.next_sequence();

        let memory = &self.memory;
        let persistent = &self.persistent;
        let client = &self.client;
        let generation = self.generation.clone();
        let cancel_previous = options.cancel_previous;
        let write_key = cache_key.clone();

        let result = self
            .inflight
            .get_or_compute(cache_key.clone(), move || async move {
                // Only the dispatch that just won inflight leadership for
                // this key reaches here, so superseding the shared token is
                // safe: a waiter that coalesces onto this computation never
                // runs this closure, and a non-cancelling dispatch (every
                // prefetch payload) gets its own standalone token instead of
                // ever touching the shared slot.
                let token = if cancel_previous {
                    generation.supersede_token()
                } else {
                    tokio_util::sync::CancellationToken::new()
                };

                let url = client.replicate(&quantized, token).await?;
                memory.put(write_key.clone(), url.clone());
                if let Err(err) = persistent.put(&write_key, &url) {
                    tracing::warn!(%err, "ccd persistent tier write failed");
                }
                Ok(url)
            })
            .await;

        match result {
            Ok(url) => {
                let applied = self.generation.try_apply(sequence);
                Ok(RunEditorOutcome { url, applied })
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_cancel_the_previous_dispatch_and_use_cache() {
        let options = RunEditorOptions::default();
        assert!(options.cancel_previous);
        assert!(!options.skip_cache);
    }
}
