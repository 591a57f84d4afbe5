//! `nd-mechanisms` — the four pluggable policy families of the `rust_nd`
//! diffusion engine.
//!
//! | Module          | Trait                  | Decides                              |
//! |-----------------|------------------------|--------------------------------------|
//! | [`sight`]       | `SightMechanism`       | which pending pieces a user observes |
//! | [`propagation`] | `PropagationMechanism` | where forwarded pieces are delivered |
//! | [`selection`]   | `SelectionMechanism`   | whether a seen piece is forwarded    |
//! | [`stop`]        | `StopCondition`        | when the simulation terminates       |
//!
//! Mechanisms compose by injection at simulator construction.  Each trait
//! has a `validate` hook so configurations a mechanism cannot run with (for
//! example, a recommended-edge policy on a graph without recommended edges)
//! are rejected before the first iteration, never mid-run.
//!
//! Evaluation methods take `&self` plus the evaluated user's own RNG, so the
//! read phase can fan out across threads; per-iteration mutable caches are
//! confined to `reset_selections`, which the simulator calls once per
//! iteration before any evaluation starts.

pub mod propagation;
pub mod selection;
pub mod sight;
pub mod stop;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use propagation::{
    AllRecommendedNeighbors, PropagationMechanism, PullPushPropagation, PushPropagation,
};
pub use selection::{
    FeatureFilterSelection, ProbabilisticSelection, PropagateAllSelection, Resolution,
    SelectionMechanism,
};
pub use sight::{
    AllNotDiscardedNorPropagatedSight, AllNotDiscardedSight, AllRecommendedSight, AllSight,
    CountSight, RecommendedProbabilitySight, SightMechanism,
};
pub use stop::{
    IterationSummary, MaxIterationsStop, MaxTimestampNoPropagatedStop, MaxTimestampStop,
    NoMoreNewStop, NoMorePropagatedStop, StopCondition, TotalPropagatedStop,
};
