//! The `PropagationMechanism` trait — where forwarded pieces are delivered.

use nd_core::{NdResult, SimRng, UserId};
use nd_data::{Data, PropagatedInfo, UserState};

mod pull_push;
mod push;
mod recommended;

pub use pull_push::PullPushPropagation;
pub use push::PushPropagation;
pub use recommended::AllRecommendedNeighbors;

/// Policy mapping a newly propagated piece to destination users.
///
/// # Contract
///
/// - [`destinations`][Self::destinations] must not mutate the graph or any
///   user state; it reads the caches built by
///   [`reset_selections`][Self::reset_selections], which the simulator calls
///   once at the top of each iteration with the global RNG.
/// - Empty candidate pools are handled locally (an empty destination list,
///   plus whatever window bookkeeping the mechanism documents) — never by
///   failing.
pub trait PropagationMechanism: Send + Sync {
    /// Rebuild per-iteration destination caches.  Default: nothing cached.
    fn reset_selections(&mut self, _data: &Data, _rng: &mut SimRng) {}

    /// Reject configurations this mechanism cannot run with.
    fn validate(&self, _data: &Data) -> NdResult<()> {
        Ok(())
    }

    /// Users that receive `piece` when `origin` forwards it.
    fn destinations(
        &self,
        piece:  &PropagatedInfo,
        origin: &UserState,
        data:   &Data,
    ) -> Vec<UserId>;

    /// Whether destinations vary by piece.  When `false` the simulator
    /// resolves destinations once per origin and reuses them for every piece
    /// the origin forwards that iteration.
    fn depends_on_piece(&self) -> bool {
        false
    }
}
