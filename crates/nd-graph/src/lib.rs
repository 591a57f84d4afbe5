//! `nd-graph` — the social-graph seam of the `rust_nd` framework.
//!
//! The diffusion engine never owns graph storage: it consumes the [`Graph`]
//! trait (neighborhood enumeration by orientation, edge-kind lookup) and any
//! engine that implements it can back a run.  [`AdjacencyGraph`] is the
//! bundled implementation — a compact CSR store suitable for tests, demos,
//! and mid-sized research graphs.
//!
//! Edges carry a *kind*: [`EdgeKind::TRAINING`] for links present in the
//! original network, [`EdgeKind::RECOMMENDED`] for links injected by a
//! recommender.  Several mechanisms condition on this distinction; it must
//! stay stable for the lifetime of a run.

pub mod adjacency;
pub mod graph;
pub mod orientation;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use adjacency::{AdjacencyGraph, AdjacencyGraphBuilder};
pub use graph::{reaches_through_recommended, EdgeKind, Graph};
pub use orientation::EdgeOrientation;
