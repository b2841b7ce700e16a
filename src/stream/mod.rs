//! Lazily-evaluated pipelines over in-memory sequences.
//!
//! A [`Stream`] is a chain of stages ending at a source that owns the
//! resident elements. Stateless stages ([`filter`](Stream::filter),
//! [`map`](Stream::map), [`peek`](Stream::peek)) only wrap the chain and run
//! nothing. Stateful stages ([`sorted`](Stream::sorted),
//! [`distinct`](Stream::distinct), [`skip`](Stream::skip),
//! [`limit`](Stream::limit), [`flat_map`](Stream::flat_map)) drive the chain
//! once into a scratch buffer, transform the buffer, and hand back a fresh
//! stream whose source owns it. Terminal operations drive the chain and
//! return a value.
//!
//! # Example
//!
//! ```rust,ignore
//! use chainflow::Stream;
//!
//! let names = Stream::new(students)
//!     .filter(|s| s.age > 20)
//!     .map(|s| s.name)
//!     .sorted(|a, b| a < b)?
//!     .to_vec()?;
//! ```
//!
//! # Parallel mode
//!
//! [`Stream::parallel`] pushes every element on its own worker. Nothing is
//! ordered across workers: `reduce` with a non-commutative function,
//! `distinct` (which duplicate survives) and `find_first` (which match is
//! returned) are nondeterministic, and short-circuiting operations may still
//! evaluate every element.

mod config;
mod driver;
mod stage;
mod stateful;
mod stateless;
mod terminal;

pub use config::{ExecutionMode, StreamConfig};

use std::fmt;

use stage::{SourceStage, Stage};
use stateless::{Filter, Map, Peek};

/// A lazily-evaluated pipeline producing values of type `T`.
pub struct Stream<T> {
    head: Box<dyn Stage<T>>,
    config: StreamConfig,
    resident: Option<usize>,
}

impl<T: Send + 'static> Stream<T> {
    /// Create a sequential pipeline over `data`.
    pub fn new<I>(data: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::with_config(data, StreamConfig::sequential())
    }

    /// Create a pipeline that fans out one worker per element.
    pub fn parallel<I>(data: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::with_config(data, StreamConfig::parallel())
    }

    /// Create a pipeline with an explicit configuration.
    pub fn with_config<I>(data: I, config: StreamConfig) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_parts(data.into_iter().collect(), config)
    }

    /// Create an empty sequential pipeline.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), StreamConfig::sequential())
    }

    /// Start a new chain whose source owns `data`.
    pub(crate) fn from_parts(data: Vec<T>, config: StreamConfig) -> Self {
        let resident = Some(data.len());
        Self {
            head: Box::new(SourceStage::new(data)),
            config,
            resident,
        }
    }

    /// Keep only the elements matching `predicate`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        Stream {
            head: Box::new(Filter::new(head, predicate)),
            config,
            resident: None,
        }
    }

    /// Replace every element with `f(element)`.
    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        Stream {
            head: Box::new(Map::new(head, f)),
            config,
            resident: None,
        }
    }

    /// Call `consumer` on every element as it passes, without changing it.
    pub fn peek<C>(self, consumer: C) -> Self
    where
        C: Fn(&T) + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        Stream {
            head: Box::new(Peek::new(head, consumer)),
            config,
            resident: None,
        }
    }

    /// Configuration this stream was created with.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Whether this stream fans out one worker per element.
    pub fn is_parallel(&self) -> bool {
        self.config.is_parallel()
    }

    /// Number of resident elements, while no stage is stacked on the source.
    pub fn len_hint(&self) -> Option<usize> {
        self.resident
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("head", &self.head.name())
            .field("config", &self.config)
            .field("resident", &self.resident)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_hint_only_on_bare_source() {
        let stream = Stream::new(vec![1u32, 2, 3]);
        assert_eq!(stream.len_hint(), Some(3));

        let stream = stream.filter(|x| *x > 1);
        assert_eq!(stream.len_hint(), None);
    }

    #[test]
    fn test_builders_keep_config() {
        let stream = Stream::parallel(vec![1u32])
            .map(|x| x + 1)
            .peek(|_| {})
            .filter(|_| true);
        assert!(stream.is_parallel());
        assert_eq!(stream.config().mode, ExecutionMode::Parallel);
    }

    #[test]
    fn test_stateless_builders_run_nothing() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let stream = Stream::new(vec![1u32, 2, 3]).peek(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(stream.count().unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_debug_names_head() {
        let stream = Stream::new(vec![1u32]).map(|x| x * 2);
        let debug = format!("{stream:?}");
        assert!(debug.contains("\"map\""));
    }

    #[test]
    fn test_empty() {
        let stream: Stream<u32> = Stream::empty();
        assert_eq!(stream.len_hint(), Some(0));
        assert!(!stream.is_parallel());
    }
}
