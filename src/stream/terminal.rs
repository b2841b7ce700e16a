//! Terminal operations.
//!
//! Each one binds a sink behind the chain, drives it once and returns a
//! value instead of another stream.

use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::Stream;
use super::driver::{self, RunContext};
use super::stage::Push;
use super::stateful::{drain, lock_scratch};

impl<T: Send + 'static> Stream<T> {
    /// Call `consumer` on every element that reaches the end of the chain.
    pub fn for_each<C>(self, consumer: C) -> Result<()>
    where
        C: Fn(T) + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        let sink: Push<T> = Arc::new(move |item: T, _ctx: &RunContext| consumer(item));
        driver::evaluate(head, sink, &config)?;
        Ok(())
    }

    /// Fold the elements with `f(accumulator, element)`, seeding the
    /// accumulator with the first element. `None` for an empty stream.
    ///
    /// In parallel mode the fold order is arrival order, so only
    /// commutative and associative functions give a stable result.
    pub fn reduce<F>(self, f: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        let acc: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let sink: Push<T> = {
            let acc = Arc::clone(&acc);
            Arc::new(move |item: T, _ctx: &RunContext| {
                let mut acc = lock_scratch(&acc);
                let next = match acc.take() {
                    Some(prev) => f(prev, item),
                    None => item,
                };
                *acc = Some(next);
            })
        };

        driver::evaluate(head, sink, &config)?;
        let result = lock_scratch(&acc).take();
        Ok(result)
    }

    /// Number of elements that reach the end of the chain.
    pub fn count(self) -> Result<usize> {
        let (buffer, _) = drain(self, "count")?;
        Ok(buffer.len())
    }

    /// Whether any element matches `predicate`.
    ///
    /// Sequential evaluation stops at the first match. An empty stream gives
    /// `false`.
    pub fn any_match<P>(self, predicate: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let (entered, stopped) = self.match_ops(predicate, true)?;
        Ok(entered && stopped)
    }

    /// Whether every element matches `predicate`.
    ///
    /// Sequential evaluation stops at the first counterexample. An empty
    /// stream gives `false`, not the vacuous `true`.
    pub fn all_match<P>(self, predicate: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let (entered, stopped) = self.match_ops(predicate, false)?;
        Ok(entered && !stopped)
    }

    /// Whether no element matches `predicate`. An empty stream gives `true`.
    pub fn none_match<P>(self, predicate: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Ok(!self.any_match(predicate)?)
    }

    /// Drive the chain, stopping once `predicate(element) == stop_on`.
    ///
    /// Returns whether any element reached the sink, and whether a stop was
    /// requested.
    fn match_ops<P>(self, predicate: P, stop_on: bool) -> Result<(bool, bool)>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        let sink: Push<T> = Arc::new(move |item: T, ctx: &RunContext| {
            ctx.mark_entered();
            if predicate(&item) == stop_on {
                ctx.request_stop();
            }
        });

        let ctx = driver::evaluate(head, sink, &config)?;
        Ok((ctx.entered(), ctx.stop_requested()))
    }

    /// First element matching `predicate`, or `None`.
    ///
    /// Sequential evaluation returns the lowest-index match and stops there.
    /// In parallel mode the result is some match, not necessarily the first.
    pub fn find_first<P>(self, predicate: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let Self { head, config, .. } = self;
        let found: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let sink: Push<T> = {
            let found = Arc::clone(&found);
            Arc::new(move |item: T, ctx: &RunContext| {
                // Best-effort: a parallel worker may still get here after a hit
                if ctx.stop_requested() || !predicate(&item) {
                    return;
                }
                let mut found = lock_scratch(&found);
                if found.is_none() {
                    *found = Some(item);
                    ctx.request_stop();
                }
            })
        };

        driver::evaluate(head, sink, &config)?;
        let found = lock_scratch(&found).take();
        Ok(found)
    }

    /// Reduce with `wins(a, b) ? a : b`.
    ///
    /// `|a, b| a > b` yields the maximum, `|a, b| a < b` the minimum. On ties
    /// the later element wins. `None` for an empty stream.
    pub fn max_min<C>(self, wins: C) -> Result<Option<T>>
    where
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.reduce(move |a, b| if wins(&a, &b) { a } else { b })
    }

    /// Append every element, in evaluation order, to `target`.
    pub fn collect_into<E>(self, target: &mut E) -> Result<()>
    where
        E: Extend<T>,
    {
        let (buffer, _) = drain(self, "collect")?;
        target.extend(buffer);
        Ok(())
    }

    /// Collect every element into a new vector.
    pub fn to_vec(self) -> Result<Vec<T>> {
        let (buffer, _) = drain(self, "collect")?;
        Ok(buffer)
    }
}
