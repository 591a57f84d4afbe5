//! The `SelectionMechanism` trait — whether a seen piece is forwarded.

use nd_core::{NdResult, UserRng};
use nd_data::{Data, PropagatedInfo, UserState};

mod basic;

pub use basic::{FeatureFilterSelection, ProbabilisticSelection, PropagateAllSelection};

/// Terminal classification of a seen piece.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Resolution {
    /// Move to `propagated`: forwarded to the propagation mechanism's
    /// destinations at the end of this iteration.
    Propagate,
    /// Move to `discarded`: never forwarded, never reconsidered.
    Discard,
}

/// Policy resolving every seen piece to exactly one terminal classification
/// before the iteration closes.
///
/// # Contract
///
/// - [`resolve`][Self::resolve] is evaluated in the read phase: it must not
///   mutate any state; the simulator commits all users' resolutions together
///   afterwards, so iteration semantics cannot depend on user order.
/// - A piece already sitting in a terminal set must resolve to that same
///   set.  Resolving it to the opposite one makes the commit fail the
///   propagated/discarded exclusivity check, which aborts the run.
pub trait SelectionMechanism: Send + Sync {
    /// Reject configurations this mechanism cannot run with.
    fn validate(&self, _data: &Data) -> NdResult<()> {
        Ok(())
    }

    /// Classify one seen piece.
    fn resolve(
        &self,
        user:  &UserState,
        data:  &Data,
        piece: &PropagatedInfo,
        rng:   &mut UserRng,
    ) -> Resolution;
}

/// Classification already forced by a terminal set, if any.
///
/// Shared guard for implementations: call first, fall through to the real
/// policy only on `None`.
pub(crate) fn forced_resolution(user: &UserState, piece: &PropagatedInfo) -> Option<Resolution> {
    if user.contains_propagated(piece.info) {
        Some(Resolution::Propagate)
    } else if user.contains_discarded(piece.info) {
        Some(Resolution::Discard)
    } else {
        None
    }
}
