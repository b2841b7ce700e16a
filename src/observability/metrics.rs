//! Metrics collection using metrics-rs.

use metrics::{Unit, counter, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::stream::ExecutionMode;

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const EVALUATIONS: &str = "chainflow_evaluations";
const ELEMENTS_DRIVEN: &str = "chainflow_elements_driven";
const WORKERS_SPAWNED: &str = "chainflow_workers_spawned";
const ELEMENTS_MATERIALIZED: &str = "chainflow_elements_materialized";
const SHORT_CIRCUITS: &str = "chainflow_short_circuits";
const EVALUATION_TIME_NS: &str = "chainflow_evaluation_time_ns";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(EVALUATIONS, Unit::Count, "Evaluation passes run");
    metrics::describe_counter!(
        ELEMENTS_DRIVEN,
        Unit::Count,
        "Source elements pushed into a chain"
    );
    metrics::describe_counter!(
        WORKERS_SPAWNED,
        Unit::Count,
        "Worker threads started by parallel fan-out"
    );
    metrics::describe_counter!(
        ELEMENTS_MATERIALIZED,
        Unit::Count,
        "Elements written to stateful stage buffers"
    );
    metrics::describe_counter!(
        SHORT_CIRCUITS,
        Unit::Count,
        "Sequential passes stopped before the end of the source"
    );
    metrics::describe_histogram!(
        EVALUATION_TIME_NS,
        Unit::Nanoseconds,
        "Wall time of one evaluation pass"
    );
}

/// Record a finished evaluation pass.
#[inline]
pub fn record_evaluation(pipeline: &str, mode: ExecutionMode, driven: usize, elapsed: Duration) {
    counter!(EVALUATIONS, "pipeline" => pipeline.to_string(), "mode" => mode.as_str()).increment(1);
    counter!(ELEMENTS_DRIVEN, "pipeline" => pipeline.to_string()).increment(driven as u64);
    histogram!(EVALUATION_TIME_NS, "pipeline" => pipeline.to_string())
        .record(elapsed.as_nanos() as f64);
}

/// Record workers started by one parallel pass.
#[inline]
pub fn record_workers_spawned(pipeline: &str, workers: usize) {
    counter!(WORKERS_SPAWNED, "pipeline" => pipeline.to_string()).increment(workers as u64);
}

/// Record the buffer size produced by a stateful stage.
#[inline]
pub fn record_materialized(pipeline: &str, stage: &'static str, len: usize) {
    counter!(ELEMENTS_MATERIALIZED, "pipeline" => pipeline.to_string(), "stage" => stage)
        .increment(len as u64);
}

/// Record a sequential pass that stopped early.
#[inline]
pub fn record_short_circuit(pipeline: &str) {
    counter!(SHORT_CIRCUITS, "pipeline" => pipeline.to_string()).increment(1);
}
