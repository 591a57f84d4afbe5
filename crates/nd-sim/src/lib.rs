//! `nd-sim` — iteration loop orchestrator for the rust_nd framework.
//!
//! # Phase order per iteration
//!
//! ```text
//! ① Reset    — clear transient seen sets; rebuild mechanism caches
//!              (sight + propagation reset_selections).
//! ② Observe  — for every user with pending pieces, the sight mechanism
//!              selects what they see; the selection mechanism classifies
//!              each seen piece (parallel with the `parallel` feature).
//!              Pure reads: nothing commits yet.
//! ③ Commit   — ascending UserId: merge seen records, move classified
//!              pieces into propagated / discarded.
//! ④ Deliver  — propagation mechanism maps forwarded pieces to
//!              destinations; deliveries buffer into per-destination
//!              inboxes, then commit per destination.
//! ⑤ Record   — assemble the immutable Iteration; evaluate the stop
//!              condition on its aggregates.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs the observe phase on Rayon's thread pool.          |
//! | `serde`    | Serde derives on `Iteration`/`Simulation` (replay I/O). |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use nd_core::SimConfig;
//! use nd_mechanisms::{AllSight, MaxIterationsStop, PropagateAllSelection, PushPropagation};
//! use nd_sim::{NoopObserver, SimulatorBuilder};
//!
//! let mut sim = SimulatorBuilder::new(
//!         SimConfig::with_seed(42),
//!         data,
//!         AllSight,
//!         PushPropagation::new(1, EdgeOrientation::Und),
//!         PropagateAllSelection,
//!         MaxIterationsStop::new(100),
//!     )
//!     .build()?;
//! let simulation = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod iteration;
pub mod observer;
pub mod sim;
pub mod simulation;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SimulatorBuilder;
pub use error::{SimError, SimResult};
pub use iteration::Iteration;
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulator;
pub use simulation::Simulation;
