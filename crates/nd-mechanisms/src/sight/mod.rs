//! The `SightMechanism` trait — which pending pieces a user observes.

use nd_core::{NdResult, UserRng};
use nd_data::{Data, PropagatedInfo, UserState};

mod all;
mod count;
mod recommended;

pub use all::{AllNotDiscardedNorPropagatedSight, AllNotDiscardedSight, AllSight};
pub use count::CountSight;
pub use recommended::{AllRecommendedSight, RecommendedProbabilitySight};

/// Policy deciding which of a user's pending pieces (`received ∪ own`) enter
/// the transient `seen` set this iteration.
///
/// # Contract
///
/// - [`sees`][Self::sees] is side-effect-free with respect to `UserState`: it
///   may draw from the user's RNG but never mutates any state, so the sight
///   phase can evaluate all (user, candidate) pairs before anything commits.
/// - [`reset_selections`][Self::reset_selections] runs once per iteration
///   before any evaluation and is the only place a mechanism may rebuild its
///   internal caches; those caches are read-only for the rest of the
///   iteration.
/// - [`select`][Self::select] is what the simulator calls: the full pass over
///   one user's candidates, in ascending piece order for reproducibility.
///   Mechanisms that cap or sample the candidate list override it; everyone
///   else gets the per-piece predicate applied.
pub trait SightMechanism: Send + Sync {
    /// Rebuild per-iteration caches.  Default: nothing to rebuild.
    fn reset_selections(&mut self, _data: &Data) {}

    /// Reject configurations this mechanism cannot run with.
    fn validate(&self, _data: &Data) -> NdResult<()> {
        Ok(())
    }

    /// Does `user` observe `piece` this iteration?
    fn sees(
        &self,
        user:  &UserState,
        data:  &Data,
        piece: &PropagatedInfo,
        rng:   &mut UserRng,
    ) -> bool;

    /// The pieces `user` observes this iteration, cloned out of the pending
    /// set.
    fn select(&self, user: &UserState, data: &Data, rng: &mut UserRng) -> Vec<PropagatedInfo> {
        let mut candidates: Vec<&PropagatedInfo> = user.pending().collect();
        candidates.sort_by_key(|r| r.info);
        candidates
            .into_iter()
            .filter(|piece| self.sees(user, data, piece, rng))
            .cloned()
            .collect()
    }
}
