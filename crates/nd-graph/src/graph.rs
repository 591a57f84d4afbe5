//! The `Graph` trait consumed by the diffusion engine.

use nd_core::UserId;

use crate::EdgeOrientation;

/// Classification of a graph edge by provenance.
///
/// The reserved values distinguish recommender-injected links from the
/// original training links; mechanisms rely on this being stable for the
/// whole run.  Applications may define further kinds above `RECOMMENDED`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EdgeKind(pub u32);

impl EdgeKind {
    /// An edge present in the original (training) network.
    pub const TRAINING: EdgeKind = EdgeKind(0);
    /// An edge injected by a recommender system.
    pub const RECOMMENDED: EdgeKind = EdgeKind(1);
}

/// Read-only view of the social network backing a run.
///
/// Implementations must be cheap to query: `neighbors` is called for every
/// user every iteration by some propagation mechanisms, and `edge_kind` per
/// (user, neighbor) pair when building recommended-neighbor caches.
pub trait Graph: Send + Sync {
    /// Number of users (nodes).  User ids are `0..user_count()`.
    fn user_count(&self) -> usize;

    /// The neighborhood of `user` under `orientation`, without duplicates.
    fn neighbors(&self, user: UserId, orientation: EdgeOrientation) -> Vec<UserId>;

    /// Kind of the directed edge `from → to`; `None` if the edge is absent.
    /// On an undirected graph the argument order is irrelevant.
    fn edge_kind(&self, from: UserId, to: UserId) -> Option<EdgeKind>;

    /// Weight of the directed edge `from → to`; `None` if absent.
    fn edge_weight(&self, from: UserId, to: UserId) -> Option<f64>;

    /// Whether the directed edge `from → to` exists.
    fn contains_edge(&self, from: UserId, to: UserId) -> bool {
        self.edge_kind(from, to).is_some()
    }

    fn is_directed(&self) -> bool;

    fn is_weighted(&self) -> bool;
}

/// Whether `neighbor` reaches `user` through a recommended edge, under the
/// given orientation.
///
/// For `In`, the delivering edge is `neighbor → user`; for `Out` it is
/// `user → neighbor`; for `Und`/`Mutual` either direction qualifies.
pub fn reaches_through_recommended(
    graph:       &dyn Graph,
    user:        UserId,
    neighbor:    UserId,
    orientation: EdgeOrientation,
) -> bool {
    match orientation {
        EdgeOrientation::In => graph.edge_kind(neighbor, user) == Some(EdgeKind::RECOMMENDED),
        EdgeOrientation::Out => graph.edge_kind(user, neighbor) == Some(EdgeKind::RECOMMENDED),
        EdgeOrientation::Und | EdgeOrientation::Mutual => {
            graph.edge_kind(user, neighbor) == Some(EdgeKind::RECOMMENDED)
                || graph.edge_kind(neighbor, user) == Some(EdgeKind::RECOMMENDED)
        }
    }
}
