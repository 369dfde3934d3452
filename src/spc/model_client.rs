//! External model invocation: create + poll with bounded retries and
//! exponential backoff (§4.4.3).
//!
//! `ModelClient` is the pluggable boundary (a real deployment points
//! `ReplicateLikeClient` at its inference provider); `invoke` is the
//! create+poll+retry loop shared by whatever implementation is plugged in.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CoreError;

#[derive(Debug, Clone, Serialize)]
pub struct ModelInput {
    pub image: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelPrediction {
    pub status: ModelStatus,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

pub trait ModelClient: Send + Sync {
    fn create<'a>(&'a self, input: &'a ModelInput) -> BoxFuture<'a, Result<String, CoreError>>;
    fn poll<'a>(&'a self, handle: &'a str) -> BoxFuture<'a, Result<ModelPrediction, CoreError>>;
}

/// Replicate-style client: `POST /predictions` to create, `GET
/// /predictions/{id}` to poll.
pub struct ReplicateLikeClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ReplicateLikeClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), api_token: api_token.into() }
    }
}

impl ModelClient for ReplicateLikeClient {
    fn create<'a>(&'a self, input: &'a ModelInput) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(async move {
            #[derive(Deserialize)]
            struct CreateResponse {
                id: String,
            }

            let response = self
                .http
                .post(format!("{}/predictions", self.base_url))
                .bearer_auth(&self.api_token)
                .json(input)
                .send()
                .await
                .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

            if !response.status().is_success() {
                return Err(CoreError::UpstreamUnavailable(format!(
                    "prediction create failed: {}",
                    response.status()
                )));
            }

            let body: CreateResponse = response
                .json()
                .await
                .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;
            Ok(body.id)
        })
    }

    fn poll<'a>(&'a self, handle: &'a str) -> BoxFuture<'a, Result<ModelPrediction, CoreError>> {
        Box::pin(async move {
            let response = self
                .http
                .get(format!("{}/predictions/{}", self.base_url, handle))
                .bearer_auth(&self.api_token)
                .send()
                .await
                .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

            if !response.status().is_success() {
                return Err(CoreError::UpstreamUnavailable(format!(
                    "prediction poll failed: {}",
                    response.status()
                )));
            }

            response
                .json()
                .await
                .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))
        })
    }
}

/// Runs the bounded create+poll cycle, retrying transient failures up to
/// `config.model_max_retries` times with `initial_backoff * 2^attempt`
/// delays between attempts. Terminal model failures are not retried.
pub async fn invoke(
    client: &dyn ModelClient,
    input: &ModelInput,
    config: &Config,
) -> Result<Vec<String>, CoreError> {
    let mut attempt = 0u32;
    let mut backoff = Duration::from_millis(config.model_initial_backoff_ms);

    loop {
        match run_once(client, input, config).await {
            Ok(outputs) => return Ok(outputs),
            Err(err) if err.is_retryable() && attempt + 1 < config.model_max_retries => {
                attempt += 1;
                tracing::warn!(attempt, %err, "model invocation failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn run_once(
    client: &dyn ModelClient,
    input: &ModelInput,
    config: &Config,
) -> Result<Vec<String>, CoreError> {
    let handle = client.create(input).await?;

    for _ in 0..config.max_poll_attempts {
        let prediction = client.poll(&handle).await?;
        match prediction.status {
            ModelStatus::Starting | ModelStatus::Processing => {
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
            }
            ModelStatus::Succeeded => return Ok(prediction.output),
            ModelStatus::Failed | ModelStatus::Canceled => {
                return Err(CoreError::ModelFailure(
                    prediction.error.unwrap_or_else(|| "terminal failure".to_string()),
                ));
            }
        }
    }

    Err(CoreError::ModelTimeout(config.max_poll_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedClient {
        create_calls: AtomicU32,
        responses: Mutex<Vec<Result<ModelPrediction, CoreError>>>,
    }

    impl ModelClient for ScriptedClient {
        fn create<'a>(&'a self, _input: &'a ModelInput) -> BoxFuture<'a, Result<String, CoreError>> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok("handle".to_string()) })
        }

        fn poll<'a>(&'a self, _handle: &'a str) -> BoxFuture<'a, Result<ModelPrediction, CoreError>> {
            let next = self.responses.lock().unwrap().pop();
            Box::pin(async move {
                next.unwrap_or(Err(CoreError::UpstreamUnavailable("exhausted script".to_string())))
            })
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.poll_interval_ms = 0;
        config.model_initial_backoff_ms = 0;
        config
    }

    #[tokio::test]
    async fn succeeds_after_processing_statuses() {
        let client = ScriptedClient {
            create_calls: AtomicU32::new(0),
            responses: Mutex::new(vec![
                Ok(ModelPrediction { status: ModelStatus::Succeeded, output: vec!["https://x/out.webp".into()], error: None }),
                Ok(ModelPrediction { status: ModelStatus::Processing, output: vec![], error: None }),
                Ok(ModelPrediction { status: ModelStatus::Starting, output: vec![], error: None }),
            ]),
        };

        let input = ModelInput { image: "https://x/a.jpg".to_string(), parameters: serde_json::json!({}) };
        let outputs = invoke(&client, &input, &config()).await.unwrap();
        assert_eq!(outputs, vec!["https://x/out.webp".to_string()]);
    }

    #[tokio::test]
    async fn terminal_failure_is_not_retried() {
        let client = ScriptedClient {
            create_calls: AtomicU32::new(0),
            responses: Mutex::new(vec![ModelPrediction { status: ModelStatus::Failed, output: vec![], error: Some("bad".into()) }].into_iter().map(Ok).rev().collect()),
        };

        let input = ModelInput { image: "https://x/a.jpg".to_string(), parameters: serde_json::json!({}) };
        let result = invoke(&client, &input, &config()).await;
        assert!(matches!(result, Err(CoreError::ModelFailure(_))));
        assert_eq!(client.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failure_retries_exactly_max_retries_times() {
        let client = ScriptedClient { create_calls: AtomicU32::new(0), responses: Mutex::new(Vec::new()) };

        let input = ModelInput { image: "https://x/a.jpg".to_string(), parameters: serde_json::json!({}) };
        let result = invoke(&client, &input, &config()).await;
        assert!(result.is_err());
        assert_eq!(client.create_calls.load(Ordering::SeqCst), config().model_max_retries);
    }
}
