//! Built-in selection policies.

use nd_core::{FeatureId, NdError, NdResult, UserRng};
use nd_data::{Data, PropagatedInfo, UserState};

use super::{forced_resolution, Resolution, SelectionMechanism};

/// Forwards everything the user sees.
pub struct PropagateAllSelection;

impl SelectionMechanism for PropagateAllSelection {
    fn resolve(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> Resolution {
        forced_resolution(user, piece).unwrap_or(Resolution::Propagate)
    }
}

/// Forwards each seen piece with a fixed probability, in the manner of the
/// independent-cascade model; the rest is discarded for good.
pub struct ProbabilisticSelection {
    prob: f64,
}

impl ProbabilisticSelection {
    pub fn new(prob: f64) -> Self {
        Self { prob }
    }
}

impl SelectionMechanism for ProbabilisticSelection {
    fn resolve(&self, user: &UserState, _: &Data, piece: &PropagatedInfo, rng: &mut UserRng) -> Resolution {
        forced_resolution(user, piece).unwrap_or_else(|| {
            if rng.gen_bool(self.prob) {
                Resolution::Propagate
            } else {
                Resolution::Discard
            }
        })
    }
}

/// Forwards only pieces whose feature value clears a threshold; everything
/// else is discarded.  A piece without the feature counts as 0.
pub struct FeatureFilterSelection {
    feature:   FeatureId,
    threshold: f64,
}

impl FeatureFilterSelection {
    pub fn new(feature: FeatureId, threshold: f64) -> Self {
        Self { feature, threshold }
    }
}

impl SelectionMechanism for FeatureFilterSelection {
    fn validate(&self, data: &Data) -> NdResult<()> {
        // Only checkable when a feature registry was loaded.
        if data.feature_name(self.feature).is_none()
            && data.pieces().all(|p| p.feature_value(self.feature).is_none())
        {
            return Err(NdError::Config(format!(
                "feature {} appears on no piece and in no registry",
                self.feature
            )));
        }
        Ok(())
    }

    fn resolve(&self, user: &UserState, data: &Data, piece: &PropagatedInfo, _: &mut UserRng) -> Resolution {
        forced_resolution(user, piece).unwrap_or_else(|| {
            let value = data
                .piece(piece.info)
                .and_then(|p| p.feature_value(self.feature))
                .unwrap_or(0.0);
            if value >= self.threshold {
                Resolution::Propagate
            } else {
                Resolution::Discard
            }
        })
    }
}
