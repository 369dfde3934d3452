//! CCD's HTTP client for `POST /api/replicate` against SPC (§4.4.1).

use tokio_util::sync::CancellationToken;

use crate::contracts::{ErrorResponse, ReplicateRequest, ReplicateResponse};
use crate::error::CoreError;

#[derive(Clone)]
pub struct SpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl SpcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    /// Posts a (quantized) request and returns the artifact URL. Resolves to
    /// `Cancelled` if `cancel` fires before the response arrives; the
    /// in-flight HTTP request is dropped at that point, but SPC may still
    /// complete and persist it server-side.
    pub async fn replicate(
        &self,
        payload: &ReplicateRequest,
        cancel: CancellationToken,
    ) -> Result<String, CoreError> {
        let request = self
            .http
            .post(format!("{}/api/replicate", self.base_url))
            .json(payload)
            .send();

        let response = tokio::select! {
            res = request => res.map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?,
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
        };

        if response.status().is_success() {
            let body: ReplicateResponse = response
                .json()
                .await
                .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;
            Ok(body.url)
        } else {
            let status = response.status();
            let body: ErrorResponse = response
                .json()
                .await
                .unwrap_or(ErrorResponse { error: status.to_string() });
            Err(CoreError::UpstreamUnavailable(body.error))
        }
    }
}
