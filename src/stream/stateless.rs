//! Stateless stages: filter, map and peek.
//!
//! Each one wraps the downstream push function at bind time and never
//! buffers, so a chain of them costs one nested call per element.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;

use super::driver::RunContext;
use super::stage::{Push, Stage};

// ============================================================================
// Filter
// ============================================================================

/// Forwards only the elements accepted by a predicate.
pub(crate) struct Filter<T, P> {
    producer: Box<dyn Stage<T>>,
    predicate: P,
}

impl<T, P> Filter<T, P> {
    pub(crate) fn new(producer: Box<dyn Stage<T>>, predicate: P) -> Self {
        Self {
            producer,
            predicate,
        }
    }
}

impl<T, P> Stage<T> for Filter<T, P>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "filter"
    }

    fn evaluate(self: Box<Self>, downstream: Push<T>, ctx: &RunContext) -> Result<()> {
        ctx.bind(self.name());
        let Self {
            producer,
            predicate,
        } = *self;
        producer.evaluate(
            Arc::new(move |item: T, ctx: &RunContext| {
                if predicate(&item) {
                    downstream(item, ctx);
                }
            }),
            ctx,
        )
    }
}

// ============================================================================
// Map
// ============================================================================

/// Forwards the transformed value instead of the original.
pub(crate) struct Map<In, Out, F> {
    producer: Box<dyn Stage<In>>,
    f: F,
    _out: PhantomData<fn() -> Out>,
}

impl<In, Out, F> Map<In, Out, F> {
    pub(crate) fn new(producer: Box<dyn Stage<In>>, f: F) -> Self {
        Self {
            producer,
            f,
            _out: PhantomData,
        }
    }
}

impl<In, Out, F> Stage<Out> for Map<In, Out, F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn(In) -> Out + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "map"
    }

    fn evaluate(self: Box<Self>, downstream: Push<Out>, ctx: &RunContext) -> Result<()> {
        ctx.bind(self.name());
        let Self { producer, f, .. } = *self;
        producer.evaluate(
            Arc::new(move |item: In, ctx: &RunContext| downstream(f(item), ctx)),
            ctx,
        )
    }
}

// ============================================================================
// Peek
// ============================================================================

/// Calls a consumer for its side effect, then forwards the element unchanged.
pub(crate) struct Peek<T, C> {
    producer: Box<dyn Stage<T>>,
    consumer: C,
}

impl<T, C> Peek<T, C> {
    pub(crate) fn new(producer: Box<dyn Stage<T>>, consumer: C) -> Self {
        Self { producer, consumer }
    }
}

impl<T, C> Stage<T> for Peek<T, C>
where
    T: Send + 'static,
    C: Fn(&T) + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "peek"
    }

    fn evaluate(self: Box<Self>, downstream: Push<T>, ctx: &RunContext) -> Result<()> {
        ctx.bind(self.name());
        let Self { producer, consumer } = *self;
        producer.evaluate(
            Arc::new(move |item: T, ctx: &RunContext| {
                consumer(&item);
                downstream(item, ctx);
            }),
            ctx,
        )
    }
}
