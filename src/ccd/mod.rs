//! Client Cache & Dispatcher: the single-threaded, event-loop side of the
//! system (§4.3, §5). Owns the two local cache tiers, the SPC HTTP client,
//! cancellation/ordering state, and the prefetch planner, and exposes
//! `runEditor` as the one path everything dispatches through.

pub mod client;
pub mod debounce;
pub mod dispatch;
pub mod generation;
pub mod image_prefetch;
pub mod memory_tier;
pub mod persistent_tier;
pub mod prefetch;

pub use debounce::Debouncer;
pub use dispatch::{Ccd, RunEditorOptions, RunEditorOutcome};
pub use image_prefetch::ImagePrefetchWorker;
pub use prefetch::PrefetchPlanner;
