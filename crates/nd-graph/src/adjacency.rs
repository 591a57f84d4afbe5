//! Compact in-memory graph and its builder.
//!
//! # Data layout
//!
//! Both adjacency directions use **Compressed Sparse Row (CSR)** format.
//! Given a `UserId u`, its outgoing edges occupy the slice:
//!
//! ```text
//! out_to[ out_start[u] .. out_start[u+1] ]
//! ```
//!
//! with kinds and weights in parallel arrays, and symmetrically for incoming
//! edges.  Neighborhood enumeration is a contiguous memory scan; edge lookup
//! is a linear probe of the source's row (degrees in social graphs used for
//! diffusion studies are small enough that a probe beats a hash map here).
//!
//! Undirected graphs are stored as two directed arcs per link; the builder
//! does the mirroring, and orientation distinctions collapse at query time.

use nd_core::UserId;

use crate::{EdgeKind, EdgeOrientation, Graph};

// ── AdjacencyGraph ────────────────────────────────────────────────────────────

/// CSR adjacency store implementing [`Graph`].
///
/// Do not construct directly; use [`AdjacencyGraphBuilder`].
pub struct AdjacencyGraph {
    directed: bool,
    weighted: bool,

    // ── Outgoing CSR ──────────────────────────────────────────────────────
    /// Row pointer, length = `user_count + 1`.
    out_start:  Vec<u32>,
    out_to:     Vec<UserId>,
    out_kind:   Vec<EdgeKind>,
    out_weight: Vec<f64>,

    // ── Incoming CSR (mirror) ─────────────────────────────────────────────
    in_start: Vec<u32>,
    in_from:  Vec<UserId>,
}

impl AdjacencyGraph {
    fn out_row(&self, user: UserId) -> std::ops::Range<usize> {
        self.out_start[user.index()] as usize..self.out_start[user.index() + 1] as usize
    }

    fn in_row(&self, user: UserId) -> std::ops::Range<usize> {
        self.in_start[user.index()] as usize..self.in_start[user.index() + 1] as usize
    }

    fn out_neighbors(&self, user: UserId) -> &[UserId] {
        &self.out_to[self.out_row(user)]
    }

    fn in_neighbors(&self, user: UserId) -> &[UserId] {
        &self.in_from[self.in_row(user)]
    }

    /// Position of the edge `from → to` in the edge arrays.
    fn edge_pos(&self, from: UserId, to: UserId) -> Option<usize> {
        if from.index() >= self.user_count() || to.index() >= self.user_count() {
            return None;
        }
        self.out_row(from).find(|&i| self.out_to[i] == to)
    }
}

impl Graph for AdjacencyGraph {
    fn user_count(&self) -> usize {
        self.out_start.len() - 1
    }

    fn neighbors(&self, user: UserId, orientation: EdgeOrientation) -> Vec<UserId> {
        if user.index() >= self.user_count() {
            return vec![];
        }
        // Undirected storage mirrors every arc, so the out-row already holds
        // the full neighborhood regardless of the requested orientation.
        if !self.directed {
            return self.out_neighbors(user).to_vec();
        }
        match orientation {
            EdgeOrientation::Out => self.out_neighbors(user).to_vec(),
            EdgeOrientation::In => self.in_neighbors(user).to_vec(),
            EdgeOrientation::Und => {
                let mut all = self.out_neighbors(user).to_vec();
                for &v in self.in_neighbors(user) {
                    if !all.contains(&v) {
                        all.push(v);
                    }
                }
                all
            }
            EdgeOrientation::Mutual => self
                .out_neighbors(user)
                .iter()
                .copied()
                .filter(|&v| self.in_neighbors(user).contains(&v))
                .collect(),
        }
    }

    fn edge_kind(&self, from: UserId, to: UserId) -> Option<EdgeKind> {
        self.edge_pos(from, to).map(|i| self.out_kind[i])
    }

    fn edge_weight(&self, from: UserId, to: UserId) -> Option<f64> {
        self.edge_pos(from, to).map(|i| self.out_weight[i])
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn is_weighted(&self) -> bool {
        self.weighted
    }
}

// ── AdjacencyGraphBuilder ─────────────────────────────────────────────────────

/// Construct an [`AdjacencyGraph`] incrementally, then call
/// [`build`](Self::build).
///
/// Edges may be added in any order; `build()` sorts them and assembles the
/// CSR arrays for both directions.  Adding the same arc twice keeps the last
/// kind/weight.
///
/// # Example
///
/// ```
/// use nd_core::UserId;
/// use nd_graph::{AdjacencyGraphBuilder, EdgeKind, EdgeOrientation, Graph};
///
/// let mut b = AdjacencyGraphBuilder::directed(3);
/// b.add_edge(UserId(0), UserId(1), EdgeKind::TRAINING);
/// b.add_edge(UserId(0), UserId(2), EdgeKind::RECOMMENDED);
/// let g = b.build();
/// assert_eq!(g.neighbors(UserId(0), EdgeOrientation::Out).len(), 2);
/// ```
pub struct AdjacencyGraphBuilder {
    user_count: usize,
    directed:   bool,
    weighted:   bool,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:   UserId,
    to:     UserId,
    kind:   EdgeKind,
    weight: f64,
}

impl AdjacencyGraphBuilder {
    /// A directed, unweighted graph over users `0..user_count`.
    pub fn directed(user_count: usize) -> Self {
        Self { user_count, directed: true, weighted: false, raw_edges: Vec::new() }
    }

    /// An undirected, unweighted graph over users `0..user_count`.
    pub fn undirected(user_count: usize) -> Self {
        Self { user_count, directed: false, weighted: false, raw_edges: Vec::new() }
    }

    /// Mark the graph as weighted.  Edges added without an explicit weight
    /// carry 1.0.
    pub fn weighted(mut self) -> Self {
        self.weighted = true;
        self
    }

    /// Add an edge of the given kind with weight 1.0.
    ///
    /// On an undirected graph the mirror arc is added automatically.
    pub fn add_edge(&mut self, from: UserId, to: UserId, kind: EdgeKind) {
        self.add_weighted_edge(from, to, kind, 1.0);
    }

    /// Add an edge with an explicit weight.
    pub fn add_weighted_edge(&mut self, from: UserId, to: UserId, kind: EdgeKind, weight: f64) {
        self.raw_edges.push(RawEdge { from, to, kind, weight });
        if !self.directed {
            self.raw_edges.push(RawEdge { from: to, to: from, kind, weight });
        }
    }

    pub fn user_count(&self) -> usize {
        self.user_count
    }

    /// Consume the builder and produce an [`AdjacencyGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sorts.
    pub fn build(self) -> AdjacencyGraph {
        let n = self.user_count;
        let mut raw = self.raw_edges;

        // Last write wins for duplicate arcs: stable sort, then dedup keeping
        // the most recently added entry.
        raw.sort_by_key(|e| (e.from.0, e.to.0));
        raw.reverse();
        let mut seen: Vec<(UserId, UserId)> = Vec::with_capacity(raw.len());
        raw.retain(|e| {
            let key = (e.from, e.to);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        raw.sort_by_key(|e| (e.from.0, e.to.0));

        let out_to:     Vec<UserId>   = raw.iter().map(|e| e.to).collect();
        let out_kind:   Vec<EdgeKind> = raw.iter().map(|e| e.kind).collect();
        let out_weight: Vec<f64>      = raw.iter().map(|e| e.weight).collect();

        let mut out_start = vec![0u32; n + 1];
        for e in &raw {
            out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=n {
            out_start[i] += out_start[i - 1];
        }

        // Incoming mirror.
        let mut incoming: Vec<(UserId, UserId)> =
            raw.iter().map(|e| (e.to, e.from)).collect();
        incoming.sort_by_key(|&(to, from)| (to.0, from.0));

        let in_from: Vec<UserId> = incoming.iter().map(|&(_, from)| from).collect();
        let mut in_start = vec![0u32; n + 1];
        for &(to, _) in &incoming {
            in_start[to.index() + 1] += 1;
        }
        for i in 1..=n {
            in_start[i] += in_start[i - 1];
        }

        AdjacencyGraph {
            directed: self.directed,
            weighted: self.weighted,
            out_start,
            out_to,
            out_kind,
            out_weight,
            in_start,
            in_from,
        }
    }
}
