//! `SimOutputObserver<W>` — bridges `SimObserver` to a `SimulationWriter`.

use nd_sim::{Iteration, SimObserver, Simulation};

use crate::writer::SimulationWriter;
use crate::OutputError;

/// A [`SimObserver`] that persists every completed iteration through any
/// [`SimulationWriter`] backend (replay, CSV, SQLite, …).
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: SimulationWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: SimulationWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: SimulationWriter> SimObserver for SimOutputObserver<W> {
    fn on_iteration_end(&mut self, iteration: &Iteration) {
        let result = self.writer.write_iteration(iteration);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _simulation: &Simulation) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
