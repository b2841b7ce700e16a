//! Stream configuration.

use std::fmt;
use std::sync::Arc;

use crate::observability::TracingConfig;

/// How the terminal driver walks the resident sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Elements are pushed one at a time, in index order, on the calling thread.
    ///
    /// Short-circuiting operations stop the pass as soon as their result is known.
    #[default]
    Sequential,

    /// One worker per element, all joined before the pass returns.
    ///
    /// No ordering holds between workers, and short-circuiting is best-effort:
    /// a worker that has already started always runs to completion.
    Parallel,
}

impl ExecutionMode {
    /// Short lowercase name, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration fixed when a stream is created.
///
/// Every source minted by a stateful stage inherits the configuration of the
/// stream it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Name used in spans, metric labels and worker thread names.
    pub name: Arc<str>,
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Tracing behavior.
    pub tracing: TracingConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: Arc::from("stream"),
            mode: ExecutionMode::default(),
            tracing: TracingConfig::default(),
        }
    }
}

impl StreamConfig {
    /// Create a config for sequential evaluation.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Create a config for per-element parallel fan-out.
    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Default::default()
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the tracing behavior.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Whether this config selects parallel fan-out.
    pub fn is_parallel(&self) -> bool {
        self.mode == ExecutionMode::Parallel
    }
}
