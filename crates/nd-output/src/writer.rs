//! The `SimulationWriter` trait implemented by all backend writers.

use nd_sim::Iteration;

use crate::OutputResult;

/// Trait implemented by the replay, CSV, and SQLite writers.
///
/// Iterations arrive in order, immutable, one call per completed step.  All
/// methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait SimulationWriter {
    /// Persist one completed iteration.
    fn write_iteration(&mut self, iteration: &Iteration) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
