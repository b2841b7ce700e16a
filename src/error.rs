//! Error types for chainflow.

use thiserror::Error;

/// Result type alias using chainflow's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipeline evaluation.
///
/// Sequential evaluation never fails. Faults raised by caller-supplied
/// callables are not represented here: they unwind out of the evaluating
/// call unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// The OS refused to start the worker for one element during parallel fan-out.
    ///
    /// Workers started before the failure have been joined when this is returned.
    #[error("failed to spawn worker for element {index}: {source}")]
    WorkerSpawn {
        /// Position of the element in the resident sequence.
        index: usize,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_spawn_display() {
        let err = Error::WorkerSpawn {
            index: 7,
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads"),
        };
        assert_eq!(
            err.to_string(),
            "failed to spawn worker for element 7: no threads"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
