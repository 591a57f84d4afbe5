//! Attention-limited sight.

use nd_core::UserRng;
use nd_data::{Data, PropagatedInfo, UserState};

use super::SightMechanism;

/// Caps the number of pieces a user may observe per iteration.
///
/// Unresolved candidates are still pending next iteration, so the cap
/// effectively restarts from zero at every sight phase.  When more than
/// `num_sight` candidates are eligible, the observed subset is drawn
/// uniformly without replacement from the user's RNG.
pub struct CountSight {
    num_sight: usize,
}

impl CountSight {
    pub fn new(num_sight: usize) -> Self {
        Self { num_sight }
    }
}

impl SightMechanism for CountSight {
    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> bool {
        !user.contains_discarded(piece.info) && !user.contains_propagated(piece.info)
    }

    fn select(&self, user: &UserState, data: &Data, rng: &mut UserRng) -> Vec<PropagatedInfo> {
        let mut eligible: Vec<&PropagatedInfo> = user.pending().collect();
        eligible.sort_by_key(|r| r.info);
        eligible.retain(|piece| self.sees(user, data, piece, rng));

        // Partial Fisher-Yates: the first `num_sight` slots end up holding a
        // uniform sample.
        let take = self.num_sight.min(eligible.len());
        for i in 0..take {
            let j = rng.gen_range(i..eligible.len());
            eligible.swap(i, j);
        }
        eligible.truncate(take);
        eligible.sort_by_key(|r| r.info);
        eligible.into_iter().cloned().collect()
    }
}
