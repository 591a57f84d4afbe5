//! Per-user information state: the six sets and their transitions.
//!
//! # State machine per (user, piece)
//!
//! ```text
//!            deliver                    sight            resolve
//! (absent) ──────────► received ────► seen ──┬─────► propagated   (terminal)
//!                         ▲                  └─────► discarded    (terminal)
//!    own ─────────────────┼─────────► seen ──┴───► (propagated, stays own)
//!                         │
//!            deliver (repeat) merges creators
//! ```
//!
//! `seen` is transient: repopulated by the sight phase each iteration and
//! cleared at the start of the next one.  `all` is the cumulative union of
//! everything the user ever held, kept for O(1) "ever seen this?" checks.
//!
//! All mutation is local to one user; nothing here touches another user's
//! state, so states shard by user id across threads without locking.

use rustc_hash::FxHashMap;
use thiserror::Error;

use nd_core::{CountingMode, InfoId, UserId};

use crate::PropagatedInfo;

/// A piece classified into both terminal sets is a defect in the selection
/// mechanism, not a recoverable condition: replay determinism is already
/// lost when it happens, so the run must abort.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("piece {info} of user {user} is already discarded; cannot propagate")]
    AlreadyDiscarded { user: UserId, info: InfoId },

    #[error("piece {info} of user {user} is already propagated; cannot discard")]
    AlreadyPropagated { user: UserId, info: InfoId },
}

/// Outcome of delivering a piece to a user.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Delivery {
    /// First time this user holds the piece.
    New,
    /// The user held (or still holds) the piece from an earlier iteration.
    Repeated,
    /// The user authored or already propagated the piece; nothing recorded.
    Dropped,
}

/// Mutable per-user container of the six information sets.
#[derive(Clone)]
pub struct UserState {
    user: UserId,
    /// Pieces authored by this user.  Never removed.
    own: FxHashMap<InfoId, PropagatedInfo>,
    /// Delivered but not yet resolved.
    received: FxHashMap<InfoId, PropagatedInfo>,
    /// Observed in the current iteration.  Transient.
    seen: FxHashMap<InfoId, PropagatedInfo>,
    /// Forwarded at least once.  Terminal.
    propagated: FxHashMap<InfoId, PropagatedInfo>,
    /// Decided never to forward.  Terminal.
    discarded: FxHashMap<InfoId, PropagatedInfo>,
    /// Cumulative superset of everything ever held.
    all: FxHashMap<InfoId, PropagatedInfo>,
}

impl UserState {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            own:        FxHashMap::default(),
            received:   FxHashMap::default(),
            seen:       FxHashMap::default(),
            propagated: FxHashMap::default(),
            discarded:  FxHashMap::default(),
            all:        FxHashMap::default(),
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    // ── Additions ─────────────────────────────────────────────────────────

    /// Register a piece authored by this user.  Also enters `all`.
    pub fn add_own(&mut self, info: PropagatedInfo) {
        self.all.insert(info.info, info.clone());
        self.own.insert(info.info, info);
    }

    /// Merge a piece into the transient `seen` set.
    ///
    /// A piece can reach the sight phase from several pending records in one
    /// iteration, so an existing entry merges (creator union) rather than
    /// being overwritten.
    pub fn add_seen(&mut self, info: PropagatedInfo, mode: CountingMode) {
        match self.seen.get_mut(&info.info) {
            Some(existing) => existing.merge(&info, mode),
            None => {
                self.seen.insert(info.info, info);
            }
        }
    }

    // ── Deliveries ────────────────────────────────────────────────────────

    /// Deliver a piece to this user, merging into `received` and `all`.
    ///
    /// Deliveries of pieces the user authored or already forwarded are
    /// dropped.  Deliveries of discarded pieces are recorded in `all` (the
    /// event is observable for repetition-aware metrics) but the piece stays
    /// terminal.
    pub fn deliver(&mut self, info: PropagatedInfo, mode: CountingMode) -> Delivery {
        let id = info.info;
        if self.own.contains_key(&id) || self.propagated.contains_key(&id) {
            return Delivery::Dropped;
        }
        if self.discarded.contains_key(&id) {
            self.merge_all(info, mode);
            return Delivery::Repeated;
        }

        let repeated = self.all.contains_key(&id);
        match self.received.get_mut(&id) {
            Some(existing) => existing.merge(&info, mode),
            None => {
                self.received.insert(id, info.clone());
            }
        }
        self.merge_all(info, mode);
        if repeated { Delivery::Repeated } else { Delivery::New }
    }

    fn merge_all(&mut self, info: PropagatedInfo, mode: CountingMode) {
        match self.all.get_mut(&info.info) {
            Some(existing) => existing.merge(&info, mode),
            None => {
                self.all.insert(info.info, info);
            }
        }
    }

    // ── Terminal transitions ──────────────────────────────────────────────

    /// Commit a seen piece as propagated: removed from `received`, entered
    /// into `propagated` (merging if it was already there from an earlier
    /// forward).  `own` membership is untouched.
    pub fn commit_propagated(&mut self, id: InfoId, mode: CountingMode) -> Result<(), StateError> {
        if self.discarded.contains_key(&id) {
            return Err(StateError::AlreadyDiscarded { user: self.user, info: id });
        }
        let record = self
            .seen
            .get(&id)
            .or_else(|| self.received.get(&id))
            .or_else(|| self.own.get(&id))
            .cloned();
        let Some(record) = record else { return Ok(()) };

        self.received.remove(&id);
        match self.propagated.get_mut(&id) {
            Some(existing) => existing.merge(&record, mode),
            None => {
                self.propagated.insert(id, record);
            }
        }
        Ok(())
    }

    /// Commit a seen piece as discarded: removed from `received`, entered
    /// into `discarded`.  Terminal — the piece is never reconsidered.
    pub fn commit_discarded(&mut self, id: InfoId, mode: CountingMode) -> Result<(), StateError> {
        if self.propagated.contains_key(&id) {
            return Err(StateError::AlreadyPropagated { user: self.user, info: id });
        }
        let record = self
            .seen
            .get(&id)
            .or_else(|| self.received.get(&id))
            .or_else(|| self.own.get(&id))
            .cloned();
        let Some(record) = record else { return Ok(()) };

        self.received.remove(&id);
        match self.discarded.get_mut(&id) {
            Some(existing) => existing.merge(&record, mode),
            None => {
                self.discarded.insert(id, record);
            }
        }
        Ok(())
    }

    // ── Membership ────────────────────────────────────────────────────────

    pub fn contains_own(&self, id: InfoId) -> bool {
        self.own.contains_key(&id)
    }

    pub fn contains_received(&self, id: InfoId) -> bool {
        self.received.contains_key(&id)
    }

    pub fn contains_seen(&self, id: InfoId) -> bool {
        self.seen.contains_key(&id)
    }

    pub fn contains_propagated(&self, id: InfoId) -> bool {
        self.propagated.contains_key(&id)
    }

    pub fn contains_discarded(&self, id: InfoId) -> bool {
        self.discarded.contains_key(&id)
    }

    pub fn contains_any(&self, id: InfoId) -> bool {
        self.all.contains_key(&id)
    }

    // ── Iteration accessors ───────────────────────────────────────────────

    pub fn own(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.own.values()
    }

    pub fn received(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.received.values()
    }

    pub fn seen(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.seen.values()
    }

    pub fn propagated(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.propagated.values()
    }

    pub fn discarded(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.discarded.values()
    }

    pub fn all(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.all.values()
    }

    /// Candidate pieces for the sight phase: `received ∪ own`.
    ///
    /// The two sets are disjoint (deliveries of own pieces are dropped), so
    /// chaining yields no duplicates.
    pub fn pending(&self) -> impl Iterator<Item = &PropagatedInfo> {
        self.received.values().chain(self.own.values())
    }

    pub fn has_pending(&self) -> bool {
        !self.received.is_empty() || !self.own.is_empty()
    }

    pub fn received_count(&self) -> usize {
        self.received.len()
    }

    pub fn all_count(&self) -> usize {
        self.all.len()
    }

    // ── Resets ────────────────────────────────────────────────────────────

    /// Clear only the transient set, at the top of each iteration.
    pub fn clear_seen(&mut self) {
        self.seen.clear();
    }

    /// Reset every set (used when restarting a simulation).  Identity stays.
    pub fn clear(&mut self) {
        self.own.clear();
        self.received.clear();
        self.seen.clear();
        self.propagated.clear();
        self.discarded.clear();
        self.all.clear();
    }

    /// Debug check of the partition invariants; cheap enough to run after
    /// every commit in tests.
    #[doc(hidden)]
    pub fn check_invariants(&self) -> bool {
        self.propagated.keys().all(|id| !self.discarded.contains_key(id))
            && self.propagated.keys().all(|id| !self.received.contains_key(id))
            && self.discarded.keys().all(|id| !self.received.contains_key(id))
            && self.received.keys().all(|id| self.all.contains_key(id))
            && self.own.keys().all(|id| self.all.contains_key(id))
            && self.propagated.keys().all(|id| self.all.contains_key(id))
            && self.discarded.keys().all(|id| self.all.contains_key(id))
    }
}
