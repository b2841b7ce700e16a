//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

use crate::stream::ExecutionMode;

/// Configuration for tracing behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Whether to wrap every evaluation pass in a span.
    pub evaluation_spans: bool,
    /// Whether to emit a trace event for every stage bound during a pass.
    pub stage_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            evaluation_spans: true,
            stage_events: false, // One event per stage per pass
        }
    }
}

impl TracingConfig {
    /// Create a new tracing config with everything enabled.
    pub fn all() -> Self {
        Self {
            evaluation_spans: true,
            stage_events: true,
        }
    }

    /// Disable all spans and per-stage events.
    pub fn none() -> Self {
        Self {
            evaluation_spans: false,
            stage_events: false,
        }
    }
}

/// Create a span for one evaluation pass.
///
/// # Example
///
/// ```rust,ignore
/// use chainflow::observability::span_evaluation;
///
/// let span = span_evaluation("orders", ExecutionMode::Sequential);
/// let _guard = span.enter();
/// ```
///
/// The `elements` field is recorded by the driver once the source is reached.
#[inline]
pub fn span_evaluation(pipeline: &str, mode: ExecutionMode) -> Span {
    span!(
        Level::DEBUG,
        "evaluate",
        pipeline = %pipeline,
        mode = %mode,
        elements = tracing::field::Empty
    )
}

/// Log a stage being bound into the push chain.
#[inline]
pub fn trace_stage_bound(pipeline: &str, stage: &str, position: usize) {
    tracing::trace!(
        pipeline = %pipeline,
        stage = %stage,
        position = position,
        "stage bound"
    );
}

/// Log a stateful stage finishing its materialization pass.
#[inline]
pub fn trace_materialized(pipeline: &str, stage: &str, len: usize) {
    tracing::debug!(
        pipeline = %pipeline,
        stage = %stage,
        len = len,
        "stage materialized"
    );
}

/// Log a sequential pass stopping early.
#[inline]
pub fn trace_short_circuit(pipeline: &str, index: usize, remaining: usize) {
    tracing::debug!(
        pipeline = %pipeline,
        index = index,
        remaining = remaining,
        "short-circuit requested"
    );
}
