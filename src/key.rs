//! Cache key derivation and cache path layout (§3, §4.2).
//!
//! A [`CacheKey`] is the hex-encoded SHA-256 digest of a hand-built canonical
//! JSON form: fields sorted ascending by name, no insignificant whitespace,
//! numbers rendered with the quantizer's own rounding (`0.50`, never `0.5`
//! truncated or `0` for a zero axis). `serde_json`'s default float
//! formatting doesn't guarantee that representation, so the canonical form
//! is assembled by hand rather than derived from `Serialize`.
//!
//! The model identifier is folded into the hashed payload (resolved open
//! question, §9): two deployments running different models must never
//! collide on the same key.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::contracts::ReplicateRequest;
use crate::params::ALL_AXES;

/// Hex-encoded SHA-256 digest of a request's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the canonical JSON string that gets hashed into a [`CacheKey`].
pub fn canonicalize(payload: &ReplicateRequest, model_id: &str) -> String {
    let mut fields: BTreeMap<&'static str, String> = BTreeMap::new();

    fields.insert("image", json_string(&payload.image));
    fields.insert("model_id", json_string(model_id));

    for axis in ALL_AXES {
        if let Some(v) = axis.get(payload) {
            fields.insert(axis.name, json_number(v));
        }
    }

    fields.insert("crop_factor", json_number(payload.crop_factor));
    fields.insert("src_ratio", json_number(payload.src_ratio));
    fields.insert("sample_ratio", json_number(payload.sample_ratio));
    fields.insert("output_format", json_string(&payload.output_format));
    fields.insert("output_quality", payload.output_quality.to_string());

    let body = fields
        .into_iter()
        .map(|(k, v)| format!("\"{k}\":{v}"))
        .collect::<Vec<_>>()
        .join(",");

    format!("{{{body}}}")
}

fn json_string(s: &str) -> String {
    serde_json::to_string(s).expect("string serialization is infallible")
}

fn json_number(v: f64) -> String {
    format!("{v:.2}")
}

/// Derives the cache key for an already-quantized payload.
pub fn derive(quantized: &ReplicateRequest, model_id: &str) -> CacheKey {
    let canonical = canonicalize(quantized, model_id);
    let digest = Sha256::digest(canonical.as_bytes());
    CacheKey(format!("{digest:x}"))
}

/// Durable-tier storage path: `cache/<version>/<sanitized-model-id>/<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePath(String);

impl CachePath {
    pub fn new(version: &str, model_id: &str, key: &CacheKey) -> Self {
        CachePath(format!("cache/{version}/{}/{}", sanitize(model_id), key.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an extension for the blob tier's artifact path, e.g. `.webp`.
    pub fn with_ext(&self, ext: &str) -> String {
        format!("{}.{}", self.0, ext)
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReplicateRequest {
        let mut req = ReplicateRequest::new("https://example.com/a.jpg".to_string());
        req.smile = Some(0.5);
        req
    }

    #[test]
    fn derivation_is_stable_for_equal_input() {
        assert_eq!(derive(&sample(), "model-a"), derive(&sample(), "model-a"));
    }

    #[test]
    fn different_model_ids_produce_different_keys() {
        assert_ne!(derive(&sample(), "model-a"), derive(&sample(), "model-b"));
    }

    #[test]
    fn absent_optional_axes_are_omitted_from_the_canonical_form() {
        let req = ReplicateRequest::new("https://example.com/a.jpg".to_string());
        let canonical = canonicalize(&req, "model-a");
        assert!(!canonical.contains("smile"));
        assert!(!canonical.contains("wink"));
    }

    #[test]
    fn zero_valued_axes_keep_two_decimal_places() {
        let mut req = ReplicateRequest::new("https://example.com/a.jpg".to_string());
        req.smile = Some(0.0);
        let canonical = canonicalize(&req, "model-a");
        assert!(canonical.contains("\"smile\":0.00"));
    }

    #[test]
    fn version_bump_changes_every_cache_path() {
        let key = derive(&sample(), "model-a");
        let v1 = CachePath::new("v1", "model-a", &key);
        let v2 = CachePath::new("v2", "model-a", &key);
        assert_ne!(v1, v2);
    }

    #[test]
    fn model_id_is_sanitized_in_the_path_but_not_the_key() {
        let key = derive(&sample(), "model/a v1");
        let path = CachePath::new("v1", "model/a v1", &key);
        assert!(path.as_str().contains("model_a_v1"));
    }
}
