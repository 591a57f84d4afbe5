//! The `Simulator` struct and its iteration loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use nd_core::{InfoId, SimConfig, SimRng, UserId, UserRngs};
use nd_data::{Data, Delivery, PropagatedInfo, UserState};
use nd_mechanisms::{
    IterationSummary, PropagationMechanism, Resolution, SelectionMechanism, SightMechanism,
    StopCondition,
};

use crate::{Iteration, SimObserver, SimResult, Simulation};

/// The diffusion simulation runner.
///
/// Holds the run's data bundle, every user's state and RNG, and the four
/// injected mechanisms; drives the five-phase iteration loop until the stop
/// condition fires, the iteration cap is hit, or the cancellation flag is
/// raised.
///
/// Create via [`SimulatorBuilder`][crate::SimulatorBuilder].
pub struct Simulator<S, P, L, C>
where
    S: SightMechanism,
    P: PropagationMechanism,
    L: SelectionMechanism,
    C: StopCondition,
{
    pub(crate) config: SimConfig,
    pub(crate) data: Data,

    /// Per-user state, indexed by `UserId`.
    pub(crate) states: Vec<UserState>,

    /// Per-user deterministic RNGs, separated for the split-borrow pattern.
    pub(crate) rngs: UserRngs,

    /// Global RNG stream feeding propagation-mechanism resets.
    pub(crate) prop_rng: SimRng,

    pub(crate) sight: S,
    pub(crate) propagation: P,
    pub(crate) selection: L,
    pub(crate) stop: C,

    /// Absolute index of the next iteration to run.
    pub(crate) next_number: u64,

    /// Position in the data bundle's sorted timestamp sequence.
    pub(crate) timestamp_idx: usize,

    pub(crate) total_propagated: u64,

    /// Latched by the first `true` from the stop condition.  Terminal.
    pub(crate) stopped: bool,

    /// External cancellation signal, checked between iterations only.
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

impl<S, P, L, C> Simulator<S, P, L, C>
where
    S: SightMechanism,
    P: PropagationMechanism,
    L: SelectionMechanism,
    C: StopCondition,
{
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the stop condition fires (or the iteration cap / the
    /// cancellation flag interrupts), returning the recorded trace.
    ///
    /// A cancelled or capped run still returns a well-formed `Simulation`
    /// holding every completed iteration.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Simulation> {
        let mut simulation = Simulation::new(self.next_number);

        while !self.stopped && !self.cancelled() {
            if let Some(cap) = self.config.max_iterations {
                if simulation.num_iterations() >= cap {
                    break;
                }
            }

            observer.on_iteration_start(self.next_number);
            let iteration = self.run_iteration()?;
            self.total_propagated += iteration.num_propagated();
            let summary = self.summarize(&iteration);
            observer.on_iteration_end(&iteration);
            simulation.push(iteration);

            self.next_number += 1;
            self.timestamp_idx += 1;
            if self.stop.check_stop(&summary, &self.data) {
                self.stopped = true;
            }
        }

        observer.on_sim_end(&simulation);
        Ok(simulation)
    }

    /// Run at most `n` iterations from the current position, ignoring the
    /// stop condition's latched state only in the sense of never re-checking
    /// a condition that already fired.  Useful for tests and stepping.
    pub fn run_iterations<O: SimObserver>(
        &mut self,
        n: u64,
        observer: &mut O,
    ) -> SimResult<Simulation> {
        let mut simulation = Simulation::new(self.next_number);
        for _ in 0..n {
            if self.stopped || self.cancelled() {
                break;
            }
            observer.on_iteration_start(self.next_number);
            let iteration = self.run_iteration()?;
            self.total_propagated += iteration.num_propagated();
            let summary = self.summarize(&iteration);
            observer.on_iteration_end(&iteration);
            simulation.push(iteration);

            self.next_number += 1;
            self.timestamp_idx += 1;
            if self.stop.check_stop(&summary, &self.data) {
                self.stopped = true;
            }
        }
        Ok(simulation)
    }

    /// Whether the stop condition has latched.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only view of every user's state, indexed by `UserId`.
    pub fn states(&self) -> &[UserState] {
        &self.states
    }

    /// Simulated timestamp the next iteration would run at; `None` once the
    /// catalogue's timestamps are exhausted.
    pub fn current_timestamp(&self) -> Option<i64> {
        self.data.timestamps().get(self.timestamp_idx).copied()
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn summarize(&self, iteration: &Iteration) -> IterationSummary {
        IterationSummary {
            iteration:         iteration.number(),
            propagated_pieces: iteration.num_propagated(),
            propagating_users: iteration.num_propagating_users(),
            newly_seen:        iteration.num_unique_seen(),
            total_propagated:  self.total_propagated,
            timestamp:         self.current_timestamp(),
        }
    }

    // ── Core iteration processing ─────────────────────────────────────────

    fn run_iteration(&mut self) -> SimResult<Iteration> {
        let number = self.next_number;
        let mode = self.config.counting;
        let mut iteration = Iteration::new(number);

        // ── Phase ①: reset transient state and mechanism caches ───────────
        for state in &mut self.states {
            state.clear_seen();
        }
        self.sight.reset_selections(&self.data);
        self.propagation.reset_selections(&self.data, &mut self.prop_rng);

        // ── Phase ②: observe (read) ───────────────────────────────────────
        //
        // The state vector is indexed by UserId, so one ascending scan
        // yields the active users sorted and duplicate-free — the
        // precondition for `get_many_mut` in the parallel path.
        let active: Vec<UserId> = self
            .states
            .iter()
            .filter(|s| s.has_pending())
            .map(|s| s.user())
            .collect();
        let observed = self.observe(&active);

        // ── Phase ③: commit seen sets and classifications ─────────────────
        //
        // Decisions arrive in ascending UserId order and commit
        // sequentially, so results do not depend on how the read phase was
        // scheduled.
        let mut outbox: Vec<(UserId, Vec<InfoId>)> = Vec::new();
        for (user, decisions) in observed {
            let state = &mut self.states[user.index()];
            let mut forwarded: Vec<InfoId> = Vec::new();
            let mut dropped: Vec<InfoId> = Vec::new();

            for (record, resolution) in decisions {
                let id = record.info;
                state.add_seen(record, mode);
                match resolution {
                    Resolution::Propagate => {
                        state.commit_propagated(id, mode)?;
                        forwarded.push(id);
                    }
                    Resolution::Discard => {
                        state.commit_discarded(id, mode)?;
                        dropped.push(id);
                    }
                }
            }

            if !forwarded.is_empty() {
                iteration.add_propagating_user(user, forwarded.clone());
                outbox.push((user, forwarded));
            }
            iteration.add_discarding_user(user, dropped);
        }

        // ── Phase ④: deliver (read, then commit per destination) ──────────
        //
        // Deliveries buffer into per-destination inboxes during the read
        // pass; a destination's state is only touched in its own commit
        // step, so no user's state is read and written concurrently.
        let mut inboxes: FxHashMap<UserId, FxHashMap<InfoId, PropagatedInfo>> =
            FxHashMap::default();

        for (sender, pieces) in &outbox {
            let origin = &self.states[sender.index()];

            if self.propagation.depends_on_piece() {
                for &piece in pieces {
                    let record = PropagatedInfo::new(piece, number as i64, *sender);
                    for dest in self.propagation.destinations(&record, origin, &self.data) {
                        enqueue(&mut inboxes, dest, record.clone(), mode);
                    }
                }
            } else {
                // Destinations are identical for every piece: resolve once.
                let probe = PropagatedInfo::new(pieces[0], number as i64, *sender);
                let dests = self.propagation.destinations(&probe, origin, &self.data);
                for &piece in pieces {
                    let record = PropagatedInfo::new(piece, number as i64, *sender);
                    for &dest in &dests {
                        enqueue(&mut inboxes, dest, record.clone(), mode);
                    }
                }
            }
        }

        let mut destinations: Vec<UserId> = inboxes.keys().copied().collect();
        destinations.sort();
        for dest in destinations {
            let inbox = inboxes.remove(&dest).unwrap_or_default();
            let mut records: Vec<PropagatedInfo> = inbox.into_values().collect();
            records.sort_by_key(|r| r.info);

            let state = &mut self.states[dest.index()];
            let mut first_time: Vec<(InfoId, Vec<UserId>)> = Vec::new();
            let mut repeated: Vec<(InfoId, Vec<UserId>)> = Vec::new();
            for record in records {
                let entry = (record.info, record.creators().to_vec());
                match state.deliver(record, mode) {
                    Delivery::New => first_time.push(entry),
                    Delivery::Repeated => repeated.push(entry),
                    Delivery::Dropped => {}
                }
            }
            iteration.add_receiving_user(dest, first_time);
            iteration.add_re_receiving_user(dest, repeated);
        }

        // ── Phase ⑤: the record is complete ───────────────────────────────
        Ok(iteration)
    }

    /// Sight selection and classification for all active users.
    ///
    /// With the `parallel` Cargo feature, the per-user work runs on Rayon's
    /// thread pool; each worker holds a disjoint `&mut UserRng`.
    #[allow(clippy::type_complexity)]
    fn observe(&mut self, active: &[UserId]) -> Vec<(UserId, Vec<(PropagatedInfo, Resolution)>)> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let states = self.states.as_slice();
        let data = &self.data;
        let sight = &self.sight;
        let selection = &self.selection;
        let rngs = &mut self.rngs;

        #[cfg(not(feature = "parallel"))]
        {
            active
                .iter()
                .map(|&user| {
                    let rng = rngs.get_mut(user);
                    let state = &states[user.index()];
                    let decisions = sight
                        .select(state, data, rng)
                        .into_iter()
                        .map(|record| {
                            let resolution = selection.resolve(state, data, &record, rng);
                            (record, resolution)
                        })
                        .collect();
                    (user, decisions)
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            // `get_many_mut` returns disjoint &mut refs indexed by unique
            // UserIds.  SAFETY precondition: the active list has unique ids
            // (single ascending scan).
            let rng_refs = rngs.get_many_mut(active);

            active
                .par_iter()
                .zip(rng_refs.into_par_iter())
                .map(|(&user, rng)| {
                    let state = &states[user.index()];
                    let decisions = sight
                        .select(state, data, rng)
                        .into_iter()
                        .map(|record| {
                            let resolution = selection.resolve(state, data, &record, rng);
                            (record, resolution)
                        })
                        .collect();
                    (user, decisions)
                })
                .collect()
        }
    }
}

/// Merge a delivery into the destination's inbox.
fn enqueue(
    inboxes: &mut FxHashMap<UserId, FxHashMap<InfoId, PropagatedInfo>>,
    dest:    UserId,
    record:  PropagatedInfo,
    mode:    nd_core::CountingMode,
) {
    inboxes
        .entry(dest)
        .or_default()
        .entry(record.info)
        .and_modify(|existing| existing.merge(&record, mode))
        .or_insert(record);
}
