//! Tracing utilities for definition rendering.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event for a provider fetch.
///
/// ```ignore
/// sculpt_trace_fetch!("collection", source.label(), params.len());
/// ```
#[macro_export]
macro_rules! sculpt_trace_fetch {
    ($provider:expr, $source:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            provider = $provider,
            source = %$source,
            params = $param_count,
            "sculpt.fetch"
        );
    };
}

/// Emit a trace-level event when the builder descends into a definition node.
///
/// ```ignore
/// sculpt_trace_build!("map", depth);
/// ```
#[macro_export]
macro_rules! sculpt_trace_build {
    ($kind:expr, $depth:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = $kind, depth = $depth, "sculpt.build");
    };
}
