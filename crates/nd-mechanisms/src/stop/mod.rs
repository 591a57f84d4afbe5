//! The `StopCondition` trait and its aggregate input.

use nd_core::NdResult;
use nd_data::Data;

mod conditions;

pub use conditions::{
    MaxIterationsStop, MaxTimestampNoPropagatedStop, MaxTimestampStop, NoMoreNewStop,
    NoMorePropagatedStop, TotalPropagatedStop,
};

/// Simulation-wide aggregates of the iteration that just closed, handed to
/// the stop condition after every step.
#[derive(Copy, Clone, Debug)]
pub struct IterationSummary {
    /// Absolute index of the just-completed iteration (offset by
    /// `initial_number` for resumed runs).
    pub iteration: u64,

    /// Pieces newly classified as propagated this iteration, summed over
    /// users.
    pub propagated_pieces: u64,

    /// Users that propagated at least one piece this iteration.
    pub propagating_users: u64,

    /// Pieces delivered to users that had never held them before.
    pub newly_seen: u64,

    /// Cumulative propagated-piece count since the run started.
    pub total_propagated: u64,

    /// Simulated timestamp the iteration ran at; `None` once the catalogue's
    /// timestamps are exhausted.
    pub timestamp: Option<i64>,
}

/// Predicate deciding termination.
///
/// Evaluated once after each iteration: `false` keeps the simulation
/// RUNNING, the first `true` moves it to STOPPED, and STOPPED is terminal —
/// the simulator never evaluates the condition again for that run.
pub trait StopCondition: Send + Sync {
    /// Reject configurations this condition cannot run with.
    fn validate(&self, _data: &Data) -> NdResult<()> {
        Ok(())
    }

    fn check_stop(&self, summary: &IterationSummary, data: &Data) -> bool;
}
