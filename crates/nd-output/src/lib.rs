//! `nd-output` — simulation persistence for the rust_nd framework.
//!
//! Three backends are provided:
//!
//! | Feature   | Backend | Files created                                      |
//! |-----------|---------|----------------------------------------------------|
//! | *(none)*  | Replay  | `simulation.ndr` (binary, random-access reload)    |
//! | *(none)*  | CSV     | `iteration_summaries.csv`, `seen_events.csv`       |
//! | `sqlite`  | SQLite  | `output.db`                                        |
//!
//! The replay backend is the round-trip format: [`read_simulation`] restores
//! a [`Simulation`] whose `iteration(i)` lookups need no re-run.  CSV and
//! SQLite persist per-iteration summaries and seen events for offline metric
//! pipelines; they are write-only.
//!
//! All backends implement [`SimulationWriter`] and are driven by
//! [`SimOutputObserver`], which implements `nd_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nd_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod binary;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use binary::{read_simulation, write_simulation, ReplayWriter};
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{IterationSummaryRow, SeenEventRow};
pub use writer::SimulationWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
