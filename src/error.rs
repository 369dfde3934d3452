//! Shared error taxonomy for CCD and SPC (§7).
//!
//! `CoreError` is the single currency both sides speak: CCD recovers
//! [`CoreError::StorageFailure`] and [`CoreError::Cancelled`] locally and
//! surfaces everything else to the UI as one "preview unavailable"
//! condition, while SPC retries the transient classes and converts terminal
//! failures into an HTTP response via [`Responder`].

use thiserror::Error;

use crate::contracts::ErrorResponse;
use crate::responder::Responder;
use crate::types::Response;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Malformed or out-of-range client input. Never retried, never cached.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network/transport failure talking to SPC or the external model.
    /// Retryable; never cached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The model itself reported a terminal failure. Not retried.
    #[error("model failure: {0}")]
    ModelFailure(String),

    /// The poll budget was exhausted before the model reached a terminal
    /// status. Retryable at the create+poll-cycle level.
    #[error("model timeout after {0} poll attempts")]
    ModelTimeout(u32),

    /// A cache tier write failed. Logged and tolerated; callers that already
    /// have a usable URL should not fail the response over this.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// A newer dispatch superseded this one. Silent to the UI.
    #[error("cancelled")]
    Cancelled,
}

impl CoreError {
    /// Whether the model create+poll retry loop should attempt this class
    /// of failure again rather than giving up immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::UpstreamUnavailable(_) | CoreError::ModelTimeout(_))
    }
}

impl Responder for CoreError {
    fn into_response(self) -> Response {
        use http::StatusCode;

        let status = match &self {
            CoreError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            CoreError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            CoreError::ModelFailure(_) => StatusCode::BAD_GATEWAY,
            CoreError::ModelTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CoreError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoreError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse { error: self.to_string() };
        let json = serde_json::to_vec(&body).unwrap_or_else(|_| b"{\"error\":\"unknown\"}".to_vec());

        let mut response = hyper::Response::new(crate::body::TakoBody::from(json));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_and_timeout_errors_are_retryable() {
        assert!(CoreError::UpstreamUnavailable("x".into()).is_retryable());
        assert!(CoreError::ModelTimeout(30).is_retryable());
        assert!(!CoreError::ModelFailure("x".into()).is_retryable());
        assert!(!CoreError::InvalidParameter("x".into()).is_retryable());
        assert!(!CoreError::Cancelled.is_retryable());
    }
}
