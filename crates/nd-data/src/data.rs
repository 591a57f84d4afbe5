//! The immutable per-run data bundle.

use nd_core::{FeatureId, InfoId, NdError, NdResult, UserId};
use nd_graph::{EdgeKind, EdgeOrientation, Graph};

use crate::InfoPiece;

/// Read-only bundle of everything a simulation run needs: the graph
/// collaborator, the piece catalogue, optional feature tables, and a few
/// precomputed views (per-author piece lists, sorted distinct timestamps,
/// recommended-edge presence).
///
/// Constructed once from external readers before the run; the simulation
/// core never mutates it.
pub struct Data {
    graph: Box<dyn Graph>,
    pieces: Vec<InfoPiece>,

    /// Pieces authored by each user, indexed by `UserId`.
    authored: Vec<Vec<InfoId>>,

    /// Sparse per-user feature values; empty when no user features were
    /// loaded.
    user_features: Vec<Vec<(FeatureId, f64)>>,

    /// Feature registry, indexed by `FeatureId`.  May be empty.
    feature_names: Vec<String>,

    /// Sorted distinct creation timestamps of the catalogue.  The simulator
    /// consumes one per iteration as its coarse clock.
    timestamps: Vec<i64>,

    /// Whether the graph carries at least one recommended edge.  Computed at
    /// construction so mechanism validation does not re-scan the graph.
    has_recommended: bool,
}

impl Data {
    /// Bundle a graph and a piece catalogue.
    ///
    /// Fails fast on a malformed catalogue: piece ids must equal their
    /// position, and authors must be valid users.
    pub fn new(graph: Box<dyn Graph>, pieces: Vec<InfoPiece>) -> NdResult<Self> {
        let user_count = graph.user_count();

        let mut authored = vec![Vec::new(); user_count];
        for (i, piece) in pieces.iter().enumerate() {
            if piece.id.index() != i {
                return Err(NdError::Config(format!(
                    "piece catalogue is not dense: entry {i} has id {}",
                    piece.id
                )));
            }
            if piece.author.index() >= user_count {
                return Err(NdError::UserNotFound(piece.author));
            }
            authored[piece.author.index()].push(piece.id);
        }

        let mut timestamps: Vec<i64> = pieces.iter().map(|p| p.timestamp).collect();
        timestamps.sort_unstable();
        timestamps.dedup();

        let has_recommended = scan_for_recommended(graph.as_ref());

        Ok(Self {
            graph,
            pieces,
            authored,
            user_features: Vec::new(),
            feature_names: Vec::new(),
            timestamps,
            has_recommended,
        })
    }

    /// Attach per-user feature values (must cover every user).
    pub fn with_user_features(
        mut self,
        features: Vec<Vec<(FeatureId, f64)>>,
    ) -> NdResult<Self> {
        if features.len() != self.user_count() {
            return Err(NdError::Config(format!(
                "user feature table has {} rows for {} users",
                features.len(),
                self.user_count()
            )));
        }
        self.user_features = features;
        Ok(self)
    }

    /// Attach the feature registry.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn graph(&self) -> &dyn Graph {
        self.graph.as_ref()
    }

    pub fn user_count(&self) -> usize {
        self.graph.user_count()
    }

    /// All users, in ascending id order.
    pub fn users(&self) -> impl Iterator<Item = UserId> {
        (0..self.user_count() as u32).map(UserId)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece(&self, id: InfoId) -> Option<&InfoPiece> {
        self.pieces.get(id.index())
    }

    pub fn pieces(&self) -> impl Iterator<Item = &InfoPiece> {
        self.pieces.iter()
    }

    /// Pieces authored by `user`.
    pub fn authored_by(&self, user: UserId) -> &[InfoId] {
        self.authored
            .get(user.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn user_feature_value(&self, user: UserId, feature: FeatureId) -> Option<f64> {
        self.user_features
            .get(user.index())?
            .iter()
            .find(|&&(f, _)| f == feature)
            .map(|&(_, v)| v)
    }

    pub fn feature_name(&self, feature: FeatureId) -> Option<&str> {
        self.feature_names.get(feature.index()).map(String::as_str)
    }

    /// Sorted distinct creation timestamps of the catalogue.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Whether the graph carries at least one recommended edge.
    pub fn has_recommended_edges(&self) -> bool {
        self.has_recommended
    }
}

/// One pass over every user's out-row (und-row for undirected graphs).
fn scan_for_recommended(graph: &dyn Graph) -> bool {
    let orientation = if graph.is_directed() {
        EdgeOrientation::Out
    } else {
        EdgeOrientation::Und
    };
    (0..graph.user_count() as u32).map(UserId).any(|u| {
        graph
            .neighbors(u, orientation)
            .iter()
            .any(|&v| {
                graph.edge_kind(u, v) == Some(EdgeKind::RECOMMENDED)
                    || graph.edge_kind(v, u) == Some(EdgeKind::RECOMMENDED)
            })
    })
}
