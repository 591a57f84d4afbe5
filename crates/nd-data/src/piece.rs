//! Catalogue entry for one information piece.

use nd_core::{FeatureId, InfoId, UserId};

/// An atomic unit of content propagated over the graph.
///
/// Catalogue entries are immutable for the run; the dynamic part of a
/// piece's journey (who delivered it to whom, how often) lives in
/// [`PropagatedInfo`](crate::PropagatedInfo) records inside each user's
/// state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoPiece {
    /// Identifier; equals the piece's position in the catalogue.
    pub id: InfoId,

    /// The user who authored the piece.
    pub author: UserId,

    /// Creation timestamp (Unix seconds or any monotone scale shared by the
    /// whole catalogue).
    pub timestamp: i64,

    /// Sparse feature values, sorted by feature id.
    pub features: Vec<(FeatureId, f64)>,
}

impl InfoPiece {
    /// A piece without features.
    pub fn new(id: InfoId, author: UserId, timestamp: i64) -> Self {
        Self { id, author, timestamp, features: Vec::new() }
    }

    /// Value of `feature` on this piece, if present.
    pub fn feature_value(&self, feature: FeatureId) -> Option<f64> {
        self.features
            .iter()
            .find(|&&(f, _)| f == feature)
            .map(|&(_, v)| v)
    }
}
