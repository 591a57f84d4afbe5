//! Broadcast over recommended edges.

use nd_core::{NdError, NdResult, SimRng, UserId};
use nd_data::{Data, PropagatedInfo, UserState};
use nd_graph::{reaches_through_recommended, EdgeOrientation};

use super::PropagationMechanism;

/// Destinations are all neighbors reached through a recommended edge, under
/// the configured orientation, for every piece alike.
///
/// The per-user neighbor lists are built on the first
/// [`reset_selections`][PropagationMechanism::reset_selections] call and
/// reused afterwards; the graph (and its edge kinds) is stable for the run.
pub struct AllRecommendedNeighbors {
    orientation: EdgeOrientation,
    targets: Vec<Vec<UserId>>,
}

impl AllRecommendedNeighbors {
    pub fn new(orientation: EdgeOrientation) -> Self {
        Self { orientation, targets: Vec::new() }
    }
}

impl PropagationMechanism for AllRecommendedNeighbors {
    fn reset_selections(&mut self, data: &Data, _: &mut SimRng) {
        if !self.targets.is_empty() {
            return;
        }
        self.targets = data
            .users()
            .map(|u| {
                data.graph()
                    .neighbors(u, self.orientation)
                    .into_iter()
                    .filter(|&v| {
                        reaches_through_recommended(data.graph(), u, v, self.orientation)
                    })
                    .collect()
            })
            .collect();
    }

    fn validate(&self, data: &Data) -> NdResult<()> {
        if data.has_recommended_edges() {
            Ok(())
        } else {
            Err(NdError::Config(
                "AllRecommendedNeighbors requires a graph with recommended edges".into(),
            ))
        }
    }

    fn destinations(&self, _: &PropagatedInfo, origin: &UserState, _: &Data) -> Vec<UserId> {
        self.targets
            .get(origin.user().index())
            .cloned()
            .unwrap_or_default()
    }
}
