//! Path parameter storage for dynamic route segments.
//!
//! The router extracts dynamic segments (e.g. `{id}` in `/items/{id}`) from
//! the matched path and stashes them in the request's extensions as
//! [`PathParams`]. This crate's own routes are all fixed-path, so nothing
//! currently deserializes `PathParams` into a typed struct, but the router
//! still populates it uniformly for any route that does declare segments.

use std::collections::HashMap;

/// Path parameters extracted from a matched route, keyed by segment name.
#[derive(Clone, Default)]
pub(crate) struct PathParams(pub HashMap<String, String>);
