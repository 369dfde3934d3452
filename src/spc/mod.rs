//! Server Proxy & Cache: the multi-worker, request-per-thread side of the
//! system (§4.4, §5). Looks up the fast KV tier and durable blob tier
//! concurrently, falls through to the external model on a double miss, and
//! persists successes to both tiers before returning.

pub mod blob_tier;
pub mod handler;
pub mod kv_tier;
pub mod model_client;

use std::sync::Arc;

use blob_tier::BlobStore;
use kv_tier::KvTier;
use model_client::{ModelClient, ModelInput};

use crate::config::Config;
use crate::contracts::ReplicateRequest;
use crate::error::CoreError;
use crate::inflight::InflightRegistry;
use crate::key::{self, CacheKey, CachePath};

pub struct Spc {
    config: Arc<Config>,
    kv: KvTier,
    blob: Box<dyn BlobStore>,
    model: Box<dyn ModelClient>,
    inflight: InflightRegistry<CacheKey, String, CoreError>,
}

impl Spc {
    pub fn new(config: Arc<Config>, kv: KvTier, blob: Box<dyn BlobStore>, model: Box<dyn ModelClient>) -> Self {
        Self { config, kv, blob, model, inflight: InflightRegistry::new() }
    }

    /// Serves one `/api/replicate` request end to end: validate, quantize,
    /// look up, and on a double miss invoke the model and persist (§4.4.1-4).
    pub async fn replicate(&self, request: ReplicateRequest) -> Result<String, CoreError> {
        validate(&request)?;

        let quantized = crate::quantize::quantize(&request, self.config.num_buckets)?;
        let cache_key = key::derive(&quantized, &self.config.model_id);
        let cache_path = CachePath::new(&self.config.cache_version, &self.config.model_id, &cache_key);

        if let Some(url) = self.lookup(&cache_path).await {
            return Ok(url);
        }

        self.inflight
            .get_or_compute(cache_key, || async {
                // A concurrent leader may have persisted this while we were
                // queued behind the in-flight entry.
                if let Some(url) = self.lookup(&cache_path).await {
                    return Ok(url);
                }

                let parameters = serde_json::to_value(&quantized).unwrap_or(serde_json::Value::Null);
                let input = ModelInput { image: quantized.image.clone(), parameters };
                let outputs = model_client::invoke(self.model.as_ref(), &input, &self.config).await?;

                let first = outputs
                    .into_iter()
                    .next()
                    .ok_or_else(|| CoreError::ModelFailure("model returned no outputs".to_string()))?;

                let bytes = reqwest::get(&first)
                    .await
                    .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?
                    .bytes()
                    .await
                    .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

                let blob_path = cache_path.with_ext(&quantized.output_format);
                let public_url = self.blob.put(&blob_path, bytes.to_vec()).await?;
                self.kv.set(cache_path.as_str().to_string(), public_url.clone()).await;

                Ok(public_url)
            })
            .await
    }

    /// Fast KV and durable blob `LIST` run concurrently; KV wins ties and a
    /// blob-only hit warms the KV tier asynchronously (§4.4.2).
    async fn lookup(&self, cache_path: &CachePath) -> Option<String> {
        let (kv_result, blob_result) =
            tokio::join!(self.kv.get(cache_path.as_str()), self.blob.list_by_prefix(cache_path.as_str()));

        if let Some(url) = kv_result {
            return Some(url);
        }

        match blob_result {
            Ok(mut urls) if !urls.is_empty() => {
                let url = urls.remove(0);
                let kv = self.kv.clone();
                let path = cache_path.as_str().to_string();
                let warm_url = url.clone();
                tokio::spawn(async move { kv.set(path, warm_url).await });
                Some(url)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(%err, "blob list_by_prefix failed during lookup");
                None
            }
        }
    }
}

fn validate(request: &ReplicateRequest) -> Result<(), CoreError> {
    if request.image.trim().is_empty() {
        return Err(CoreError::InvalidParameter("image is required".to_string()));
    }

    match request.output_format.as_str() {
        "webp" | "png" | "jpg" => {}
        other => return Err(CoreError::InvalidParameter(format!("unsupported output_format: {other}"))),
    }

    if !(1..=100).contains(&request.output_quality) {
        return Err(CoreError::InvalidParameter("output_quality must be in [1, 100]".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_image() {
        let req = ReplicateRequest::new(String::new());
        assert!(matches!(validate(&req), Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_unsupported_output_format() {
        let mut req = ReplicateRequest::new("https://x/a.jpg".to_string());
        req.output_format = "gif".to_string();
        assert!(matches!(validate(&req), Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_out_of_range_output_quality() {
        let mut req = ReplicateRequest::new("https://x/a.jpg".to_string());
        req.output_quality = 0;
        assert!(matches!(validate(&req), Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let req = ReplicateRequest::new("https://x/a.jpg".to_string());
        assert!(validate(&req).is_ok());
    }
}
