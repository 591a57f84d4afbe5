//! The immutable record of one simulation step.

use std::collections::BTreeMap;

use nd_core::{InfoId, UserId};

/// `(piece, delivering creators)` — one observed arrival.
pub type SeenEntry = (InfoId, Vec<UserId>);

/// Everything that happened in one iteration, grouped by the role a user
/// played: receiving (first arrival), re-receiving (repeat arrival),
/// propagating, discarding.
///
/// Produced by the simulator at the end of each step and never mutated
/// afterwards; metrics pipelines and the persistence layer consume it as-is.
/// `BTreeMap` keys keep every enumeration in ascending user order, so two
/// runs with the same seed serialize identically.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iteration {
    number: u64,

    seen:        BTreeMap<UserId, Vec<SeenEntry>>,
    re_received: BTreeMap<UserId, Vec<SeenEntry>>,
    propagated:  BTreeMap<UserId, Vec<InfoId>>,
    discarded:   BTreeMap<UserId, Vec<InfoId>>,

    // Aggregates, maintained incrementally by the adders.
    num_seen:               u64,
    num_unique_seen:        u64,
    num_re_received:        u64,
    num_unique_re_received: u64,
    num_propagated:         u64,
    num_discarded:          u64,
}

impl Iteration {
    pub fn new(number: u64) -> Self {
        Self { number, ..Self::default() }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    // ── Adders (used by the simulator while the record is under assembly) ─

    /// Record the pieces `user` received for the first time.  Rejected (and
    /// ignored) when empty or when the user was already recorded.
    pub fn add_receiving_user(&mut self, user: UserId, mut pieces: Vec<SeenEntry>) -> bool {
        if pieces.is_empty() || self.seen.contains_key(&user) {
            return false;
        }
        pieces.sort_by_key(|&(info, _)| info);
        self.num_unique_seen += pieces.len() as u64;
        self.num_seen += pieces.iter().map(|(_, c)| c.len() as u64).sum::<u64>();
        self.seen.insert(user, pieces);
        true
    }

    /// Record the pieces `user` received again this iteration.
    pub fn add_re_receiving_user(&mut self, user: UserId, mut pieces: Vec<SeenEntry>) -> bool {
        if pieces.is_empty() || self.re_received.contains_key(&user) {
            return false;
        }
        pieces.sort_by_key(|&(info, _)| info);
        self.num_unique_re_received += pieces.len() as u64;
        self.num_re_received += pieces.iter().map(|(_, c)| c.len() as u64).sum::<u64>();
        self.re_received.insert(user, pieces);
        true
    }

    /// Record the pieces `user` forwarded this iteration.
    pub fn add_propagating_user(&mut self, user: UserId, mut pieces: Vec<InfoId>) -> bool {
        if pieces.is_empty() || self.propagated.contains_key(&user) {
            return false;
        }
        pieces.sort();
        self.num_propagated += pieces.len() as u64;
        self.propagated.insert(user, pieces);
        true
    }

    /// Record the pieces `user` discarded this iteration.
    pub fn add_discarding_user(&mut self, user: UserId, mut pieces: Vec<InfoId>) -> bool {
        if pieces.is_empty() || self.discarded.contains_key(&user) {
            return false;
        }
        pieces.sort();
        self.num_discarded += pieces.len() as u64;
        self.discarded.insert(user, pieces);
        true
    }

    // ── Users by role ─────────────────────────────────────────────────────

    pub fn receiving_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.seen.keys().copied()
    }

    pub fn re_receiving_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.re_received.keys().copied()
    }

    pub fn propagating_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.propagated.keys().copied()
    }

    pub fn discarding_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.discarded.keys().copied()
    }

    // ── Per-user event lists ──────────────────────────────────────────────

    pub fn seen_information(&self, user: UserId) -> &[SeenEntry] {
        self.seen.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn re_received_information(&self, user: UserId) -> &[SeenEntry] {
        self.re_received.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn propagated_information(&self, user: UserId) -> &[InfoId] {
        self.propagated.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn discarded_information(&self, user: UserId) -> &[InfoId] {
        self.discarded.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    pub fn num_receiving_users(&self) -> u64 {
        self.seen.len() as u64
    }

    pub fn num_re_receiving_users(&self) -> u64 {
        self.re_received.len() as u64
    }

    pub fn num_propagating_users(&self) -> u64 {
        self.propagated.len() as u64
    }

    pub fn num_discarding_users(&self) -> u64 {
        self.discarded.len() as u64
    }

    /// Deliveries observed for the first time, counting multiplicity (one
    /// per delivering creator).
    pub fn num_seen(&self) -> u64 {
        self.num_seen
    }

    /// Distinct (user, piece) pairs observed for the first time.
    pub fn num_unique_seen(&self) -> u64 {
        self.num_unique_seen
    }

    pub fn num_re_received(&self) -> u64 {
        self.num_re_received
    }

    pub fn num_unique_re_received(&self) -> u64 {
        self.num_unique_re_received
    }

    pub fn num_propagated(&self) -> u64 {
        self.num_propagated
    }

    pub fn num_discarded(&self) -> u64 {
        self.num_discarded
    }
}
