//! `nd-core` — foundational types for the `rust_nd` information-diffusion
//! framework.
//!
//! This crate is a dependency of every other `nd-*` crate.  It intentionally
//! has no `nd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                      |
//! |-------------|-----------------------------------------------|
//! | [`ids`]     | `UserId`, `InfoId`, `FeatureId`               |
//! | [`config`]  | `SimConfig`, `CountingMode`                   |
//! | [`rng`]     | `UserRng` (per-user), `SimRng` (global)       |
//! | [`error`]   | `NdError`, `NdResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                                      |
//! |---------|-----------------------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types (needed by `nd-output`). |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CountingMode, SimConfig};
pub use error::{NdError, NdResult};
pub use ids::{FeatureId, InfoId, UserId};
pub use rng::{SimRng, UserRng, UserRngs};
