//! Binary replay backend.
//!
//! # File layout
//!
//! A fixed header followed by the bincode-encoded iteration list:
//!
//! ```text
//! magic "NDRP" | version u16 | initial_number u64 | Vec<Iteration>
//! ```
//!
//! The logical structure per iteration (receiving users with their
//! `(piece, creator-set)` lists, the symmetric re-received section, the
//! propagating and discarding sections) is exactly the in-memory
//! [`Iteration`]; readers reconstruct [`Simulation::iteration`] as a plain
//! vector lookup with no re-run.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use nd_sim::{Iteration, Simulation};

use crate::writer::SimulationWriter;
use crate::{OutputError, OutputResult};

const MAGIC: [u8; 4] = *b"NDRP";
const VERSION: u16 = 1;

/// Write a complete trace to `path` in one call.
pub fn write_simulation(path: &Path, simulation: &Simulation) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&MAGIC)?;
    bincode::serialize_into(&mut out, &VERSION)?;
    bincode::serialize_into(&mut out, &simulation.initial_number())?;
    let iterations: Vec<&Iteration> = simulation.iterations().collect();
    bincode::serialize_into(&mut out, &iterations)?;
    out.flush()?;
    Ok(())
}

/// Restore the trace persisted at `path`.
pub fn read_simulation(path: &Path) -> OutputResult<Simulation> {
    let mut input = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(OutputError::BadMagic);
    }
    let version: u16 = bincode::deserialize_from(&mut input)?;
    if version != VERSION {
        return Err(OutputError::UnsupportedVersion(version));
    }

    let initial_number: u64 = bincode::deserialize_from(&mut input)?;
    let iterations: Vec<Iteration> = bincode::deserialize_from(&mut input)?;
    Ok(Simulation::from_parts(initial_number, iterations))
}

/// Incremental replay writer: buffers iterations as they complete and
/// serializes the whole file on [`finish`](SimulationWriter::finish).
///
/// Rewriting wholesale keeps the on-disk file either absent or complete —
/// a crash mid-run never leaves a half-written trace behind.
pub struct ReplayWriter {
    path:       PathBuf,
    iterations: Vec<Iteration>,
    finished:   bool,
}

impl ReplayWriter {
    pub fn new(path: &Path) -> Self {
        Self {
            path:       path.to_path_buf(),
            iterations: Vec::new(),
            finished:   false,
        }
    }
}

impl SimulationWriter for ReplayWriter {
    fn write_iteration(&mut self, iteration: &Iteration) -> OutputResult<()> {
        self.iterations.push(iteration.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let initial = self.iterations.first().map(Iteration::number).unwrap_or(0);
        let simulation =
            Simulation::from_parts(initial, std::mem::take(&mut self.iterations));
        write_simulation(&self.path, &simulation)
    }
}
