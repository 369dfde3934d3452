//! Wire contract for the `/api/replicate` HTTP surface (§6).
//!
//! Field names are `snake_case` to match the JSON the client actually sends;
//! this is also the shape that gets canonicalized and hashed into a
//! [`crate::key::CacheKey`], so keep its `Serialize` derive in sync with
//! [`crate::key::canonicalize`] if fields are ever added.

use serde::{Deserialize, Serialize};

use crate::responder::Responder;
use crate::types::Response;

fn default_output_format() -> String {
    "webp".to_string()
}

fn default_output_quality() -> u32 {
    100
}

fn default_sample_ratio() -> f64 {
    1.0
}

fn default_crop_factor() -> f64 {
    2.5
}

fn default_src_ratio() -> f64 {
    1.0
}

/// Request body for `POST /api/replicate`.
///
/// All nine face parameter axes are optional: an absent axis means "leave
/// this expression dimension unchanged," and quantization/key derivation
/// propagate that absence rather than substituting a default value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateRequest {
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_roll: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pupil_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pupil_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smile: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blink: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wink: Option<f64>,

    #[serde(default = "default_crop_factor")]
    pub crop_factor: f64,
    #[serde(default = "default_src_ratio")]
    pub src_ratio: f64,
    #[serde(default = "default_sample_ratio")]
    pub sample_ratio: f64,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_output_quality")]
    pub output_quality: u32,
}

impl ReplicateRequest {
    /// Builds a request with every axis absent and transport fields at their
    /// declared defaults. Convenient for constructing sweep payloads.
    pub fn new(image: String) -> Self {
        Self {
            image,
            rotate_pitch: None,
            rotate_yaw: None,
            rotate_roll: None,
            pupil_x: None,
            pupil_y: None,
            smile: None,
            blink: None,
            eyebrow: None,
            wink: None,
            crop_factor: default_crop_factor(),
            src_ratio: default_src_ratio(),
            sample_ratio: default_sample_ratio(),
            output_format: default_output_format(),
            output_quality: default_output_quality(),
        }
    }
}

/// Success response: `{"url": string}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateResponse {
    pub url: String,
}

impl Responder for ReplicateResponse {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self).unwrap_or_default();
        let mut response = hyper::Response::new(crate::body::TakoBody::from(body));
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Error response body: `{"error": string}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_axes_are_omitted_from_serialization() {
        let req = ReplicateRequest::new("https://example.com/a.jpg".to_string());
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("rotate_pitch"));
        assert!(json.contains("\"output_format\":\"webp\""));
    }

    #[test]
    fn missing_transport_fields_deserialize_to_declared_defaults() {
        let req: ReplicateRequest =
            serde_json::from_str(r#"{"image":"https://example.com/a.jpg"}"#).unwrap();
        assert_eq!(req.output_format, "webp");
        assert_eq!(req.output_quality, 100);
        assert_eq!(req.sample_ratio, 1.0);
        assert_eq!(req.crop_factor, 2.5);
        assert_eq!(req.src_ratio, 1.0);
        assert!(req.smile.is_none());
    }
}
