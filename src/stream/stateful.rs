//! Stateful stages.
//!
//! Every operation here follows the same shape: push the whole upstream
//! chain once into a scratch buffer owned by the stage, transform the buffer
//! in bulk, then move it into a brand-new source. The returned stream shares
//! nothing with the chain it was built from except its configuration.
//!
//! The scratch buffer sits behind one mutex per stage instance. Parallel
//! workers serialize on it; arrival order into the buffer is whatever order
//! the workers reach the lock in.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::observability::{record_materialized, trace_materialized};

use super::Stream;
use super::config::StreamConfig;
use super::driver::{self, RunContext};
use super::stage::Push;

/// Lock a scratch buffer.
///
/// A poisoned lock means a caller callable panicked while holding it; that
/// panic is already unwinding out of the pass, so the data is taken as is.
pub(crate) fn lock_scratch<U>(scratch: &Mutex<U>) -> MutexGuard<'_, U> {
    scratch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drive `stream` once, folding every element into a fresh buffer.
pub(crate) fn materialize<T, U, F>(
    stream: Stream<T>,
    stage: &'static str,
    fold: F,
) -> Result<(Vec<U>, StreamConfig)>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(&mut Vec<U>, T) + Send + Sync + 'static,
{
    let Stream { head, config, .. } = stream;
    let scratch: Arc<Mutex<Vec<U>>> = Arc::default();
    let sink: Push<T> = {
        let scratch = Arc::clone(&scratch);
        Arc::new(move |item: T, _ctx: &RunContext| fold(&mut *lock_scratch(&scratch), item))
    };

    driver::evaluate(head, sink, &config)?;

    let buffer = std::mem::take(&mut *lock_scratch(&scratch));
    trace_materialized(&config.name, stage, buffer.len());
    record_materialized(&config.name, stage, buffer.len());
    Ok((buffer, config))
}

/// Drive `stream` once, appending every element in arrival order.
pub(crate) fn drain<T: Send + 'static>(
    stream: Stream<T>,
    stage: &'static str,
) -> Result<(Vec<T>, StreamConfig)> {
    materialize(stream, stage, |buffer: &mut Vec<T>, item: T| {
        buffer.push(item)
    })
}

/// Total order derived from a strict "a before b" relation.
fn precedence<T, C>(before: &C, a: &T, b: &T) -> Ordering
where
    C: Fn(&T, &T) -> bool,
{
    if before(a, b) {
        Ordering::Less
    } else if before(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Sort the elements with `before(a, b)` meaning "a comes before b".
    ///
    /// The sort is stable: elements neither of which comes before the other
    /// keep their relative order.
    pub fn sorted<C>(self, before: C) -> Result<Self>
    where
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let (mut buffer, config) = drain(self, "sorted")?;
        buffer.sort_by(|a, b| precedence(&before, a, b));
        Ok(Self::from_parts(buffer, config))
    }

    /// Drop every element `same(kept, candidate)` reports as a duplicate of
    /// an element already kept. The first occurrence wins and order is kept.
    ///
    /// Quadratic in the number of kept elements.
    pub fn distinct<C>(self, same: C) -> Result<Self>
    where
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let (buffer, config) =
            materialize(self, "distinct", move |kept: &mut Vec<T>, candidate: T| {
                if !kept.iter().any(|existing| same(existing, &candidate)) {
                    kept.push(candidate);
                }
            })?;
        Ok(Self::from_parts(buffer, config))
    }

    /// Drop the first `n` elements. Skipping past the end yields an empty stream.
    pub fn skip(self, n: usize) -> Result<Self> {
        let (mut buffer, config) = drain(self, "skip")?;
        let n = n.min(buffer.len());
        buffer.drain(..n);
        Ok(Self::from_parts(buffer, config))
    }

    /// Keep at most the first `max` elements.
    pub fn limit(self, max: usize) -> Result<Self> {
        let (mut buffer, config) = drain(self, "limit")?;
        buffer.truncate(max);
        Ok(Self::from_parts(buffer, config))
    }

    /// Replace every element with the elements of `f(element)`, flattened.
    ///
    /// Order is kept both across source elements and within each nested
    /// sequence. In parallel mode the nested sequences themselves arrive in
    /// any order, but each one is appended contiguously.
    pub fn flat_map<U, I, F>(self, f: F) -> Result<Stream<U>>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U>,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        // Expand outside the lock, append under it
        let nested = self.map(move |item| f(item).into_iter().collect::<Vec<U>>());
        let (buffer, config) =
            materialize(nested, "flat_map", |buffer: &mut Vec<U>, items: Vec<U>| {
                buffer.extend(items)
            })?;
        Ok(Stream::from_parts(buffer, config))
    }

    /// Group elements by `key(element)`, dropping elements whose key is `None`.
    ///
    /// Within a group, elements keep evaluation order (source order in
    /// sequential mode, arrival order in parallel mode). Groups are unordered.
    pub fn group_by<K, F>(self, key: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> Option<K> + Send + Sync + 'static,
    {
        let keyed = self.map(move |item| (key(&item), item));
        let (buffer, _) = materialize(
            keyed,
            "group_by",
            |buffer: &mut Vec<(K, T)>, (key, item): (Option<K>, T)| {
                if let Some(key) = key {
                    buffer.push((key, item));
                }
            },
        )?;

        let mut groups: HashMap<K, Vec<T>> = HashMap::new();
        for (key, item) in buffer {
            groups.entry(key).or_default().push(item);
        }
        Ok(groups)
    }
}
