//! Observability features: metrics and tracing.
//!
//! - **Metrics**: counters and histograms via `metrics-rs`
//! - **Tracing**: structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `chainflow_evaluations` | Counter | Evaluation passes, labelled by mode |
//! | `chainflow_elements_driven` | Counter | Source elements pushed into a chain |
//! | `chainflow_workers_spawned` | Counter | Parallel fan-out workers started |
//! | `chainflow_elements_materialized` | Counter | Elements buffered by stateful stages |
//! | `chainflow_short_circuits` | Counter | Sequential passes stopped early |
//! | `chainflow_evaluation_time_ns` | Histogram | Wall time of one pass |
//!
//! Nothing is exported unless the application installs a `metrics` recorder.
//!
//! ## Tracing
//!
//! Every pass runs inside an `evaluate` span. Stage binding is logged at
//! `TRACE` when [`TracingConfig::stage_events`] is set; materialization and
//! short-circuits are logged at `DEBUG`.

mod metrics;
mod tracing_support;

pub use self::metrics::{
    init_metrics, record_evaluation, record_materialized, record_short_circuit,
    record_workers_spawned,
};
pub use tracing_support::{
    TracingConfig, span_evaluation, trace_materialized, trace_short_circuit, trace_stage_bound,
};
