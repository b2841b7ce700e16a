//! Stage trait and the head-of-chain source.
//!
//! A chain is built back to front: every stage owns the stage that feeds it
//! (its producer) and nothing else. Forward adjacency does not exist until a
//! terminal operation asks for it. [`Stage::evaluate`] then walks the
//! producer links from the requesting stage down to the source, wrapping
//! the downstream push function at every step, so that by the time the
//! source is reached it holds a single composed push function for the whole
//! chain.

use std::sync::Arc;

use crate::error::Result;

use super::driver::{self, RunContext};

/// Push function handed from a stage to its producer at bind time.
///
/// Shared by every parallel worker of one pass, hence `Sync`.
pub(crate) type Push<T> = Arc<dyn Fn(T, &RunContext) + Send + Sync>;

/// One link in a pipeline chain producing values of type `T`.
pub(crate) trait Stage<T>: Send {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Bind `downstream` behind this stage, then keep walking towards the
    /// source, which drives the resident sequence through the composed chain.
    fn evaluate(self: Box<Self>, downstream: Push<T>, ctx: &RunContext) -> Result<()>;
}

/// Head of a chain: owns the resident sequence.
pub(crate) struct SourceStage<T> {
    data: Vec<T>,
}

impl<T> SourceStage<T> {
    pub(crate) fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T: Send + 'static> Stage<T> for SourceStage<T> {
    fn name(&self) -> &'static str {
        "source"
    }

    fn evaluate(self: Box<Self>, downstream: Push<T>, ctx: &RunContext) -> Result<()> {
        ctx.bind(self.name());
        driver::drive(self.data, downstream, ctx)
    }
}
