//! Simulation observer trait for progress reporting and data collection.

use crate::{Iteration, Simulation};

/// Callbacks invoked by [`Simulator::run`][crate::Simulator::run] at key
/// points in the iteration loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Iterations are immutable once handed
/// to `on_iteration_end`, so observers may persist them asynchronously
/// without affecting the next iteration.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_iteration_end(&mut self, iteration: &Iteration) {
///         if iteration.number() % self.interval == 0 {
///             println!(
///                 "iteration {}: {} users propagated",
///                 iteration.number(),
///                 iteration.num_propagating_users(),
///             );
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each iteration, before any processing.
    fn on_iteration_start(&mut self, _number: u64) {}

    /// Called with the completed, immutable record of each iteration.
    fn on_iteration_end(&mut self, _iteration: &Iteration) {}

    /// Called once after the loop exits (stop condition, cap, or
    /// cancellation), with the full trace produced so far.
    fn on_sim_end(&mut self, _simulation: &Simulation) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
