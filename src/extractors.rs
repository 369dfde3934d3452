//! HTTP request data extraction utilities and traits.
//!
//! This module provides a system for extracting data from HTTP requests in a
//! type-safe and ergonomic way. The module defines two core traits:
//! `FromRequest` for extractors that need access to the full request
//! (including body), and `FromRequestParts` for extractors that only need
//! request metadata like headers and URI.
//!
//! # Examples
//!
//! ```rust
//! use facecache::extractors::{FromRequest, FromRequestParts};
//! use facecache::types::Request;
//! use http::request::Parts;
//!
//! struct UserAgent(String);
//!
//! impl<'a> FromRequestParts<'a> for UserAgent {
//!     type Error = &'static str;
//!
//!     async fn from_request_parts(parts: &'a mut Parts) -> Result<Self, Self::Error> {
//!         let user_agent = parts.headers
//!             .get("user-agent")
//!             .and_then(|v| v.to_str().ok())
//!             .unwrap_or("unknown");
//!         Ok(UserAgent(user_agent.to_string()))
//!     }
//! }
//! ```

use http::request::Parts;

/// JSON request body parsing and deserialization.
pub mod json;

/// Path parameter extraction from dynamic route segments.
pub mod params;

/// Global state extraction for handler dependency injection.
pub mod state;

/// Trait for extracting data from complete HTTP requests.
///
/// `FromRequest` enables types to extract and parse data from HTTP requests,
/// including access to the request body. This trait is designed for
/// extractors that need to consume or parse the request body, such as the
/// `Json<T>` extractor used by the `/api/replicate` handler.
pub trait FromRequest<'a>: Sized {
    /// Error type returned when extraction fails.
    type Error: crate::responder::Responder;

    /// Extracts the type from the HTTP request.
    fn from_request(
        req: &'a mut crate::types::Request,
    ) -> impl core::future::Future<Output = core::result::Result<Self, Self::Error>> + Send + 'a;
}

/// Trait for extracting data from HTTP request parts (metadata only).
///
/// `FromRequestParts` enables types to extract data from request metadata
/// such as headers, URI, method, and extensions, without needing access to
/// the request body.
pub trait FromRequestParts<'a>: Sized {
    /// Error type returned when extraction fails.
    type Error: crate::responder::Responder;

    /// Extracts the type from the HTTP request parts.
    fn from_request_parts(
        parts: &'a mut Parts,
    ) -> impl core::future::Future<Output = core::result::Result<Self, Self::Error>> + Send + 'a;
}

// -----------------------------------------------------------------------------
// Built-in extractor for borrowing the request itself in handlers: `&mut Request`.
// -----------------------------------------------------------------------------
impl<'a> FromRequest<'a> for &'a mut crate::types::Request {
    type Error = core::convert::Infallible;

    fn from_request(
        req: &'a mut crate::types::Request,
    ) -> impl core::future::Future<Output = core::result::Result<Self, Self::Error>> + Send + 'a
    {
        std::future::ready(Ok(req))
    }
}
