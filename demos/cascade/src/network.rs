//! Shared demo network definition.
//!
//! A ring of users over training edges, with a few recommender-injected
//! chords cutting across it.  The chords are what make the recommended-edge
//! mechanisms do something visible at this scale.

use nd_core::UserId;
use nd_graph::{AdjacencyGraph, AdjacencyGraphBuilder, EdgeKind};

/// Build an undirected ring of `users` with a recommended chord from every
/// fourth user to the user halfway around.
pub fn build_network(users: usize) -> AdjacencyGraph {
    let mut b = AdjacencyGraphBuilder::undirected(users);

    for i in 0..users {
        let next = (i + 1) % users;
        b.add_edge(UserId(i as u32), UserId(next as u32), EdgeKind::TRAINING);
    }
    for i in (0..users).step_by(4) {
        let across = (i + users / 2) % users;
        if across != i {
            b.add_edge(UserId(i as u32), UserId(across as u32), EdgeKind::RECOMMENDED);
        }
    }

    b.build()
}
