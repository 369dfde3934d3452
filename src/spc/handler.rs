//! HTTP surface for `POST /api/replicate` (§4.4.1, §6).
//!
//! `register` wires the single route onto a [`Router`]: the method
//! restriction is expressed as explicit routes for every other verb pointing
//! at [`method_not_allowed`], rather than a catch-all, since the router
//! dispatches on an exact `(Method, path)` match.

use http::{HeaderName, Method, StatusCode};

use crate::extractors::json::Json;
use crate::extractors::state::State;
use crate::responder::{Responder, StaticHeaders};
use crate::router::Router;

use super::Spc;

const PATH: &str = "/api/replicate";

/// Registers `/api/replicate` on `router`, with `spc` injected via global
/// state for the [`State`] extractor to pick up.
pub fn register(router: &mut Router, spc: Spc) {
    router.state(spc);
    router.route(Method::POST, PATH, replicate);

    for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD, Method::OPTIONS] {
        router.route(method, PATH, method_not_allowed);
    }
}

async fn replicate(
    State(spc): State<Spc>,
    Json(request): Json<crate::contracts::ReplicateRequest>,
) -> Result<crate::contracts::ReplicateResponse, crate::error::CoreError> {
    let url = spc.replicate(request).await?;
    Ok(crate::contracts::ReplicateResponse { url })
}

async fn method_not_allowed() -> impl Responder {
    (StatusCode::METHOD_NOT_ALLOWED, StaticHeaders([(HeaderName::from_static("allow"), "POST")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Response;

    #[tokio::test]
    async fn non_post_verbs_respond_405_with_allow_header() {
        let response: Response = method_not_allowed().await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("allow").and_then(|v| v.to_str().ok()), Some("POST"));
    }
}
