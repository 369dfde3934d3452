//! Caching and request-coordination core for interactive photo expression editing.
//!
//! This crate implements the shared wire contracts, parameter quantizer, cache
//! key derivation, inflight-coalescing registry, client-side cache/dispatcher
//! (CCD) and server-side proxy/cache (SPC) described by the design this crate
//! is built against. The HTTP surface for the SPC is a trimmed fork of the
//! framework's own `router`/`server`/`handler`/`extractors` stack.
//!
//! # Key concepts
//! - [router::Router] manages routes, middleware and dispatch for the SPC.
//! - [extractors] parse request data (JSON bodies, path params, injected state).
//! - [responder::Responder] converts return values into HTTP responses.
//! - [config] loads process-wide tunables from the environment.
//! - [error] defines the shared error taxonomy used across CCD and SPC.
//! - [quantize] and [key] implement parameter quantization and cache-key derivation.
//! - [inflight] coalesces concurrent lookups for the same cache key.
//! - [ccd] and [spc] implement the two cooperating components.

/// HTTP request and response body handling utilities.
pub mod body;

/// Request data extraction utilities for JSON bodies, path params, and state.
pub mod extractors;

/// Request handler traits and implementations.
mod handler;

/// Middleware for processing requests and responses in a pipeline.
pub mod middleware;

/// Response generation utilities and traits.
pub mod responder;

/// Route definition and matching logic.
mod route;

/// Request routing and dispatch functionality.
pub mod router;

/// HTTP server implementation and configuration.
pub mod server;

/// Application state management and dependency injection.
pub mod state;

/// Distributed tracing / structured logging setup.
pub mod tracing;

/// Core type definitions used throughout the HTTP stack.
pub mod types;

/// Process-wide configuration loaded from the environment.
pub mod config;

/// Shared error taxonomy for CCD and SPC.
pub mod error;

/// Face expression parameters and their declared ranges.
pub mod params;

/// Pure uniform-partition quantization of face parameters.
pub mod quantize;

/// Canonical JSON serialization and cache key derivation.
pub mod key;

/// Wire contracts shared between CCD, SPC and the model backend.
pub mod contracts;

/// Generic single-flight inflight-request coalescing registry.
pub mod inflight;

/// Client Cache & Dispatcher: tiered lookup, prefetch, cancellation.
pub mod ccd;

/// Server Proxy & Cache: fast/durable tiers, model invocation, HTTP surface.
pub mod spc;

pub use bytes::Bytes;
pub use http::{Method, StatusCode, header};
pub use http_body_util::Full;

/// Starts the HTTP server with the given listener and router.
///
/// # Examples
///
/// ```rust,no_run
/// use facecache::{serve, router::Router};
/// use tokio::net::TcpListener;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = TcpListener::bind("127.0.0.1:8080").await?;
/// let router = Router::new();
/// serve(listener, router).await;
/// # Ok(())
/// # }
/// ```
pub use server::serve;
