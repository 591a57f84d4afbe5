//! Built-in stop conditions.

use nd_data::Data;

use super::{IterationSummary, StopCondition};

/// Stops when the absolute iteration index reaches `max` — i.e. after `max`
/// iterations for a fresh run.
pub struct MaxIterationsStop {
    max: u64,
}

impl MaxIterationsStop {
    pub fn new(max: u64) -> Self {
        Self { max }
    }
}

impl StopCondition for MaxIterationsStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.iteration + 1 >= self.max
    }
}

/// Stops when an iteration delivers no piece to anyone who had not held it
/// before.
pub struct NoMoreNewStop;

impl StopCondition for NoMoreNewStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.newly_seen == 0
    }
}

/// Stops when an iteration produces no propagation activity at all.
pub struct NoMorePropagatedStop;

impl StopCondition for NoMorePropagatedStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.propagated_pieces == 0
    }
}

/// Stops once the cumulative propagated count reaches `target`.
pub struct TotalPropagatedStop {
    target: u64,
}

impl TotalPropagatedStop {
    pub fn new(target: u64) -> Self {
        Self { target }
    }
}

impl StopCondition for TotalPropagatedStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.total_propagated >= self.target
    }
}

/// Stops once the simulated timestamp exceeds `bound` (or the catalogue's
/// timestamps run out).
pub struct MaxTimestampStop {
    bound: i64,
}

impl MaxTimestampStop {
    pub fn new(bound: i64) -> Self {
        Self { bound }
    }
}

impl StopCondition for MaxTimestampStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.timestamp.is_none_or(|t| t > self.bound)
    }
}

/// Conjunctive variant: the timestamp bound must be exceeded *and* the
/// iteration must show no propagation activity.
pub struct MaxTimestampNoPropagatedStop {
    bound: i64,
}

impl MaxTimestampNoPropagatedStop {
    pub fn new(bound: i64) -> Self {
        Self { bound }
    }
}

impl StopCondition for MaxTimestampNoPropagatedStop {
    fn check_stop(&self, summary: &IterationSummary, _: &Data) -> bool {
        summary.timestamp.is_none_or(|t| t > self.bound) && summary.propagated_pieces == 0
    }
}
