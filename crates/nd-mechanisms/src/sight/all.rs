//! Unconditional sight policies, differing only in which terminal sets they
//! exclude.

use nd_core::UserRng;
use nd_data::{Data, PropagatedInfo, UserState};

use super::SightMechanism;

/// Every pending, not-yet-propagated piece is seen.
pub struct AllSight;

impl SightMechanism for AllSight {
    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> bool {
        !user.contains_propagated(piece.info)
    }
}

/// Excludes previously discarded pieces; already-propagated pieces stay
/// visible, which lets users keep re-forwarding their own pieces.
pub struct AllNotDiscardedSight;

impl SightMechanism for AllNotDiscardedSight {
    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> bool {
        !user.contains_discarded(piece.info)
    }
}

/// Excludes both terminal sets: a piece is observed until the user resolves
/// it, then never again.
pub struct AllNotDiscardedNorPropagatedSight;

impl SightMechanism for AllNotDiscardedNorPropagatedSight {
    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> bool {
        !user.contains_discarded(piece.info) && !user.contains_propagated(piece.info)
    }
}
