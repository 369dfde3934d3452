//! Structured logging setup shared by the `spc-server` and `ccd-bench` binaries.
//!
//! Configures a `tracing_subscriber` fmt layer driven by `RUST_LOG` (via
//! `EnvFilter`), defaulting to `info` when the variable is unset or
//! unparseable. SPC logs lookups, model retries and persistence failures at
//! `info`/`warn`; CCD logs cache-tier hits/misses, cancellations and prefetch
//! sweep progress at `debug`.

use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber with formatted, leveled output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_filter(filter),
        )
        .init();
}
