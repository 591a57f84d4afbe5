//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `iteration_summaries` and `seen_events`.

use std::path::Path;

use rusqlite::Connection;

use nd_sim::Iteration;

use crate::row::{IterationSummaryRow, SeenEventRow};
use crate::writer::SimulationWriter;
use crate::OutputResult;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS iteration_summaries (
                 iteration          INTEGER PRIMARY KEY,
                 receiving_users    INTEGER NOT NULL,
                 seen               INTEGER NOT NULL,
                 unique_seen        INTEGER NOT NULL,
                 re_receiving_users INTEGER NOT NULL,
                 re_received        INTEGER NOT NULL,
                 propagating_users  INTEGER NOT NULL,
                 propagated         INTEGER NOT NULL,
                 discarding_users   INTEGER NOT NULL,
                 discarded          INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS seen_events (
                 iteration INTEGER NOT NULL,
                 user      INTEGER NOT NULL,
                 info      INTEGER NOT NULL,
                 creators  TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl SimulationWriter for SqliteWriter {
    fn write_iteration(&mut self, iteration: &Iteration) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let row = IterationSummaryRow::from_iteration(iteration);
            tx.execute(
                "INSERT INTO iteration_summaries \
                 (iteration, receiving_users, seen, unique_seen, re_receiving_users, \
                  re_received, propagating_users, propagated, discarding_users, discarded) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    row.iteration,
                    row.receiving_users,
                    row.seen,
                    row.unique_seen,
                    row.re_receiving_users,
                    row.re_received,
                    row.propagating_users,
                    row.propagated,
                    row.discarding_users,
                    row.discarded,
                ],
            )?;

            let mut stmt = tx.prepare_cached(
                "INSERT INTO seen_events (iteration, user, info, creators) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for event in SeenEventRow::from_iteration(iteration) {
                stmt.execute(rusqlite::params![
                    event.iteration,
                    event.user,
                    event.info,
                    event.creators,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
