//! # Chainflow
//!
//! Lazily-evaluated, push-based data pipelines over in-memory sequences.
//!
//! A pipeline is a chain of stages over a resident `Vec`. Stateless stages
//! (filter, map, peek) compose into a single nested push call per element
//! and never buffer. Stateful stages (sorted, distinct, skip, limit,
//! flat_map) materialize the upstream chain once and re-seed a new source
//! from the result. Terminal operations drive the chain to completion.
//!
//! ## Features
//!
//! - **Typed chains**: every stage is checked at compile time, element type
//!   changes flow through `map` and `flat_map`
//! - **Two execution modes**: strict index order on the calling thread, or
//!   one worker per element
//! - **Short-circuiting**: `any_match`, `all_match` and `find_first` stop a
//!   sequential pass as soon as the answer is known
//! - **Observability**: `tracing` spans per pass, `metrics` counters
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainflow::prelude::*;
//!
//! let top = Stream::new(vec![3, 1, 2, 1])
//!     .distinct(|a, b| a == b)?
//!     .sorted(|a, b| a < b)?
//!     .to_vec()?;
//! assert_eq!(top, vec![1, 2, 3]);
//!
//! let total = Stream::parallel(ages).reduce(|a, b| a + b)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod observability;
pub mod stream;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::stream::{ExecutionMode, Stream, StreamConfig};
}

pub use error::{Error, Result};
pub use stream::{ExecutionMode, Stream, StreamConfig};
