//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `iteration_summaries.csv`
//! - `seen_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use nd_sim::Iteration;

use crate::row::{IterationSummaryRow, SeenEventRow};
use crate::writer::SimulationWriter;
use crate::OutputResult;

/// Writes iteration summaries and seen events to two CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("iteration_summaries.csv"))?;
        summaries.write_record([
            "iteration",
            "receiving_users",
            "seen",
            "unique_seen",
            "re_receiving_users",
            "re_received",
            "propagating_users",
            "propagated",
            "discarding_users",
            "discarded",
        ])?;

        let mut events = Writer::from_path(dir.join("seen_events.csv"))?;
        events.write_record(["iteration", "user", "info", "creators"])?;

        Ok(Self { summaries, events, finished: false })
    }
}

impl SimulationWriter for CsvWriter {
    fn write_iteration(&mut self, iteration: &Iteration) -> OutputResult<()> {
        let row = IterationSummaryRow::from_iteration(iteration);
        self.summaries.write_record(&[
            row.iteration.to_string(),
            row.receiving_users.to_string(),
            row.seen.to_string(),
            row.unique_seen.to_string(),
            row.re_receiving_users.to_string(),
            row.re_received.to_string(),
            row.propagating_users.to_string(),
            row.propagated.to_string(),
            row.discarding_users.to_string(),
            row.discarded.to_string(),
        ])?;

        for event in SeenEventRow::from_iteration(iteration) {
            self.events.write_record(&[
                event.iteration.to_string(),
                event.user.to_string(),
                event.info.to_string(),
                event.creators,
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
