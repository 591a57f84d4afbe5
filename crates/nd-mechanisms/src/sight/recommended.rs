//! Sight policies conditioned on recommended edges.

use rustc_hash::FxHashSet;

use nd_core::{NdError, NdResult, UserId, UserRng};
use nd_data::{Data, PropagatedInfo, UserState};
use nd_graph::{reaches_through_recommended, EdgeOrientation};

use super::SightMechanism;

/// Per-user sets of neighbors reached through a recommended edge, indexed by
/// `UserId`.  The graph is stable for the run, so one build serves every
/// iteration.
fn build_recommended_sets(data: &Data, orientation: EdgeOrientation) -> Vec<FxHashSet<UserId>> {
    data.users()
        .map(|u| {
            data.graph()
                .neighbors(u, orientation)
                .into_iter()
                .filter(|&v| reaches_through_recommended(data.graph(), u, v, orientation))
                .collect()
        })
        .collect()
}

fn require_recommended(data: &Data, mechanism: &str) -> NdResult<()> {
    if data.has_recommended_edges() {
        Ok(())
    } else {
        Err(NdError::Config(format!(
            "{mechanism} requires a graph with recommended edges"
        )))
    }
}

// ── AllRecommendedSight ───────────────────────────────────────────────────────

/// Restricts sight to pieces delivered by a recommended neighbor.
///
/// `orientation` selects which neighborhood counts as "delivering": `In`
/// means the creator follows an edge towards the user.
pub struct AllRecommendedSight {
    orientation: EdgeOrientation,
    recommended: Vec<FxHashSet<UserId>>,
}

impl AllRecommendedSight {
    pub fn new(orientation: EdgeOrientation) -> Self {
        Self { orientation, recommended: Vec::new() }
    }
}

impl SightMechanism for AllRecommendedSight {
    fn reset_selections(&mut self, data: &Data) {
        if self.recommended.is_empty() {
            self.recommended = build_recommended_sets(data, self.orientation);
        }
    }

    fn validate(&self, data: &Data) -> NdResult<()> {
        require_recommended(data, "AllRecommendedSight")
    }

    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> bool {
        if user.contains_discarded(piece.info) || user.contains_propagated(piece.info) {
            return false;
        }
        let allowed = &self.recommended[user.user().index()];
        piece.creators().iter().any(|c| allowed.contains(c))
    }
}

// ── RecommendedProbabilitySight ───────────────────────────────────────────────

/// Two observation probabilities: one for pieces arriving over recommended
/// edges, one for pieces arriving over training edges.
///
/// One uniform draw is made per creator; the piece is observed if any draw
/// succeeds (logical OR over creators) and the user has not already
/// propagated it.
pub struct RecommendedProbabilitySight {
    prob_rec:    f64,
    prob_train:  f64,
    orientation: EdgeOrientation,
    recommended: Vec<FxHashSet<UserId>>,
}

impl RecommendedProbabilitySight {
    pub fn new(prob_rec: f64, prob_train: f64, orientation: EdgeOrientation) -> Self {
        Self { prob_rec, prob_train, orientation, recommended: Vec::new() }
    }
}

impl SightMechanism for RecommendedProbabilitySight {
    fn reset_selections(&mut self, data: &Data) {
        if self.recommended.is_empty() {
            self.recommended = build_recommended_sets(data, self.orientation);
        }
    }

    fn validate(&self, data: &Data) -> NdResult<()> {
        require_recommended(data, "RecommendedProbabilitySight")
    }

    fn sees(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, rng: &mut UserRng) -> bool {
        if user.contains_propagated(piece.info) {
            return false;
        }
        let allowed = &self.recommended[user.user().index()];
        piece.creators().iter().any(|c| {
            let p = if allowed.contains(c) { self.prob_rec } else { self.prob_train };
            rng.gen_bool(p)
        })
    }
}
