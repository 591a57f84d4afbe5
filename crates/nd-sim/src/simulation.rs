//! An ordered, randomly-indexable sequence of iterations.

use nd_core::{CountingMode, UserId};
use nd_data::{Data, PropagatedInfo, UserState};

use crate::Iteration;

/// The full trace of a run: `initial_number` (offset of the first iteration,
/// non-zero for resumed runs) plus the iterations in order.
///
/// Built incrementally by a live simulator, or wholesale by a persistence
/// reader; either way [`iteration`](Self::iteration) is a pure random-access
/// lookup.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Simulation {
    initial_number: u64,
    iterations: Vec<Iteration>,
}

impl Simulation {
    pub fn new(initial_number: u64) -> Self {
        Self { initial_number, iterations: Vec::new() }
    }

    /// Reassemble from persisted parts.  Used by replay readers.
    pub fn from_parts(initial_number: u64, iterations: Vec<Iteration>) -> Self {
        Self { initial_number, iterations }
    }

    pub fn initial_number(&self) -> u64 {
        self.initial_number
    }

    pub fn num_iterations(&self) -> u64 {
        self.iterations.len() as u64
    }

    /// Absolute index of the iteration a continuation run would start at.
    pub fn next_number(&self) -> u64 {
        self.initial_number + self.num_iterations()
    }

    /// Append the next iteration.  Numbers must stay contiguous.
    pub fn push(&mut self, iteration: Iteration) {
        debug_assert_eq!(iteration.number(), self.next_number());
        self.iterations.push(iteration);
    }

    /// The iteration with absolute index `number`, if recorded.
    pub fn iteration(&self, number: u64) -> Option<&Iteration> {
        let offset = number.checked_sub(self.initial_number)?;
        self.iterations.get(offset as usize)
    }

    pub fn iterations(&self) -> impl Iterator<Item = &Iteration> {
        self.iterations.iter()
    }

    /// Replay the recorded trace through fresh user states.
    ///
    /// Within each iteration the classifications (propagated, discarded)
    /// apply before the deliveries, matching the live phase order, so the
    /// returned states equal the live simulator's states after its last
    /// recorded iteration.  Own pieces are seeded from the catalogue first.
    ///
    /// This is what lets a run resume from persistence without re-running the
    /// mechanisms: the trace already fixes every decision.
    pub fn rebuild_state(&self, data: &Data, mode: CountingMode) -> Vec<UserState> {
        let mut states: Vec<UserState> = data.users().map(UserState::new).collect();
        for user in data.users() {
            for &piece in data.authored_by(user) {
                let timestamp = data.piece(piece).map(|p| p.timestamp).unwrap_or_default();
                states[user.index()].add_own(PropagatedInfo::new(piece, timestamp, user));
            }
        }

        for iteration in &self.iterations {
            for user in iteration.propagating_users() {
                for &piece in iteration.propagated_information(user) {
                    // The trace is internally consistent, so a commit cannot
                    // conflict here; ignore the impossible error branch.
                    let _ = states[user.index()].commit_propagated(piece, mode);
                }
            }
            for user in iteration.discarding_users() {
                for &piece in iteration.discarded_information(user) {
                    let _ = states[user.index()].commit_discarded(piece, mode);
                }
            }

            let timestamp = iteration.number() as i64;
            for user in iteration.receiving_users() {
                for (piece, creators) in iteration.seen_information(user) {
                    deliver(&mut states[user.index()], *piece, timestamp, creators, mode);
                }
            }
            for user in iteration.re_receiving_users() {
                for (piece, creators) in iteration.re_received_information(user) {
                    deliver(&mut states[user.index()], *piece, timestamp, creators, mode);
                }
            }
        }
        states
    }
}

fn deliver(
    state:     &mut UserState,
    piece:     nd_core::InfoId,
    timestamp: i64,
    creators:  &[UserId],
    mode:      CountingMode,
) {
    state.deliver(
        PropagatedInfo::with_creators(piece, timestamp, creators.to_vec()),
        mode,
    );
}
