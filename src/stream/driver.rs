//! Terminal driver.
//!
//! [`evaluate`] is the only way a chain ever runs. It opens a fresh
//! [`RunContext`], lets the requesting stage bind the chain back to its
//! source, and the source then calls [`drive`] with the composed push
//! function:
//!
//! - **Sequential**: elements are pushed in index order on the calling
//!   thread. The stop flag is checked after every element.
//! - **Parallel**: one scoped worker thread per element, no batching. The
//!   stop flag is never consulted between launches, so short-circuiting is
//!   best-effort: workers already running always finish. All workers are
//!   joined before the pass returns.

use std::panic;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::Span;

use crate::error::{Error, Result};
use crate::observability::{
    record_evaluation, record_short_circuit, record_workers_spawned, span_evaluation,
    trace_short_circuit, trace_stage_bound,
};

use super::config::{ExecutionMode, StreamConfig};
use super::stage::{Push, Stage};

/// State shared by every stage and worker for the duration of one pass.
///
/// A new context is opened per pass, so independent pipelines (and
/// successive passes of one pipeline) never observe each other's flags.
#[derive(Debug)]
pub(crate) struct RunContext {
    config: StreamConfig,
    span: Span,
    stop: AtomicBool,
    entered: AtomicBool,
    bound: AtomicUsize,
}

impl RunContext {
    fn new(config: StreamConfig, span: Span) -> Self {
        Self {
            config,
            span,
            stop: AtomicBool::new(false),
            entered: AtomicBool::new(false),
            bound: AtomicUsize::new(0),
        }
    }

    pub(crate) fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Ask the driver to stop after the current element.
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Record that at least one element reached the terminal stage.
    pub(crate) fn mark_entered(&self) {
        self.entered.store(true, Ordering::SeqCst);
    }

    pub(crate) fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    /// Register a stage met during the binding walk.
    pub(crate) fn bind(&self, stage: &'static str) {
        let position = self.bound.fetch_add(1, Ordering::SeqCst);
        if self.config.tracing.stage_events {
            trace_stage_bound(&self.config.name, stage, position);
        }
    }

    /// Number of stages bound so far, the source included.
    pub(crate) fn bound(&self) -> usize {
        self.bound.load(Ordering::SeqCst)
    }
}

/// Run `stage` and everything upstream of it once, feeding `sink`.
///
/// Returns the context of the finished pass so callers can inspect its flags.
pub(crate) fn evaluate<T: Send + 'static>(
    stage: Box<dyn Stage<T>>,
    sink: Push<T>,
    config: &StreamConfig,
) -> Result<RunContext> {
    let span = if config.tracing.evaluation_spans {
        span_evaluation(&config.name, config.mode)
    } else {
        Span::none()
    };
    let _guard = span.enter();
    let ctx = RunContext::new(config.clone(), span.clone());

    stage.evaluate(sink, &ctx)?;
    Ok(ctx)
}

/// Push the resident sequence through a fully bound chain.
pub(crate) fn drive<T: Send + 'static>(
    data: Vec<T>,
    push: Push<T>,
    ctx: &RunContext,
) -> Result<()> {
    let config = ctx.config();
    let len = data.len();
    // Only the pass's own span; never the caller's current one
    ctx.span.record("elements", len);
    tracing::debug!(
        pipeline = %config.name,
        mode = %config.mode,
        stages = ctx.bound(),
        elements = len,
        "driving source"
    );

    let started = Instant::now();
    let driven = match config.mode {
        ExecutionMode::Sequential => drive_sequential(data, &push, ctx),
        ExecutionMode::Parallel => drive_parallel(data, &push, ctx)?,
    };
    record_evaluation(&config.name, config.mode, driven, started.elapsed());

    tracing::debug!(pipeline = %config.name, driven = driven, "pass complete");
    Ok(())
}

fn drive_sequential<T>(data: Vec<T>, push: &Push<T>, ctx: &RunContext) -> usize {
    let len = data.len();
    for (index, item) in data.into_iter().enumerate() {
        push(item, ctx);
        if ctx.stop_requested() {
            let name = &ctx.config().name;
            trace_short_circuit(name, index, len - index - 1);
            record_short_circuit(name);
            return index + 1;
        }
    }
    len
}

fn drive_parallel<T: Send>(data: Vec<T>, push: &Push<T>, ctx: &RunContext) -> Result<usize> {
    let name = &ctx.config().name;

    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(data.len());
        let mut spawn_error = None;

        for (index, item) in data.into_iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn_scoped(scope, move || push(item, ctx));
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(source) => {
                    tracing::warn!(
                        pipeline = %name,
                        index = index,
                        error = %source,
                        "worker spawn failed, joining started workers"
                    );
                    spawn_error = Some(Error::WorkerSpawn { index, source });
                    break;
                }
            }
        }

        let started = workers.len();
        record_workers_spawned(name, started);

        // Join everything before surfacing a caller panic
        let mut fault = None;
        for worker in workers {
            if let Err(payload) = worker.join() {
                fault.get_or_insert(payload);
            }
        }
        if let Some(payload) = fault {
            panic::resume_unwind(payload);
        }

        match spawn_error {
            Some(err) => Err(err),
            None => Ok(started),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::TracingConfig;
    use crate::stream::stage::SourceStage;
    use std::sync::{Arc, Mutex};
    use tracing::span::{Id, Record};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;

    fn recording_sink(seen: &Arc<Mutex<Vec<u32>>>, stop_at: Option<u32>) -> Push<u32> {
        let seen = Arc::clone(seen);
        Arc::new(move |item: u32, ctx: &RunContext| {
            seen.lock().unwrap().push(item);
            if Some(item) == stop_at {
                ctx.request_stop();
            }
        })
    }

    fn source(data: Vec<u32>) -> Box<dyn Stage<u32>> {
        Box::new(SourceStage::new(data))
    }

    #[test]
    fn test_sequential_stops_after_request() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ctx = evaluate(
            source(vec![1, 2, 3, 4]),
            recording_sink(&seen, Some(2)),
            &StreamConfig::sequential(),
        )
        .unwrap();

        assert!(ctx.stop_requested());
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_parallel_visits_every_element() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        evaluate(
            source((0..32).collect()),
            recording_sink(&seen, None),
            &StreamConfig::parallel(),
        )
        .unwrap();

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_empty_source() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ctx = evaluate(
            source(Vec::new()),
            recording_sink(&seen, None),
            &StreamConfig::parallel(),
        )
        .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert!(!ctx.entered());
    }

    #[test]
    fn test_parallel_worker_panic_propagates() {
        let sink: Push<u32> = Arc::new(|item: u32, _ctx: &RunContext| {
            if item == 3 {
                panic!("bad element");
            }
        });
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            evaluate(source(vec![1, 2, 3, 4]), sink, &StreamConfig::parallel())
        }));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"bad element"));
    }

    #[test]
    fn test_parallel_workers_are_named() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink: Push<u32> = {
            let names = Arc::clone(&names);
            Arc::new(move |_item: u32, _ctx: &RunContext| {
                let name = thread::current().name().map(str::to_owned);
                names.lock().unwrap().push(name);
            })
        };
        let config = StreamConfig::parallel().with_name("ages");
        evaluate(source(vec![7]), sink, &config).unwrap();

        assert_eq!(*names.lock().unwrap(), vec![Some("ages-0".to_owned())]);
    }

    #[derive(Clone, Default)]
    struct RecordedSpans(Arc<Mutex<Vec<&'static str>>>);

    impl<S> Layer<S> for RecordedSpans
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_record(&self, id: &Id, _values: &Record<'_>, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                self.0.lock().unwrap().push(span.name());
            }
        }
    }

    #[test]
    fn test_elements_recorded_on_pass_span_only() {
        let recorded = RecordedSpans::default();
        let subscriber = tracing_subscriber::registry().with(recorded.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        tracing::subscriber::with_default(subscriber, || {
            let caller = tracing::info_span!("caller", elements = tracing::field::Empty);
            let _entered = caller.enter();

            let quiet = StreamConfig::sequential().with_tracing(TracingConfig::none());
            evaluate(source(vec![1, 2]), recording_sink(&seen, None), &quiet).unwrap();

            let traced = StreamConfig::sequential();
            evaluate(source(vec![3]), recording_sink(&seen, None), &traced).unwrap();
        });

        assert_eq!(*recorded.0.lock().unwrap(), vec!["evaluate"]);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_contexts_are_per_pass() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let config = StreamConfig::sequential();
        let first = evaluate(source(vec![1]), recording_sink(&seen, Some(1)), &config).unwrap();
        let second = evaluate(source(vec![1]), recording_sink(&seen, None), &config).unwrap();

        assert!(first.stop_requested());
        assert!(!second.stop_requested());
    }
}
