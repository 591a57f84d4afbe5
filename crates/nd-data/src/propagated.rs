//! Delivery record: one information piece's arrival at one user.

use nd_core::{CountingMode, InfoId, UserId};

/// Record of a piece held by (or in flight to) a user.
///
/// `creators` are the users who delivered the piece — the forwarding
/// neighbors of the current delivery events, not necessarily the original
/// author.  `times` counts deliveries; it defaults to `|creators|` but the
/// two diverge under [`CountingMode::Repetition`], where repeat deliveries
/// from the same creator keep counting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropagatedInfo {
    /// The piece being delivered.
    pub info: InfoId,

    /// When the delivery happened.  Deliveries produced during a run carry
    /// the iteration number; records seeded from the catalogue carry the
    /// piece's creation timestamp.
    pub timestamp: i64,

    /// Delivering users, sorted and deduplicated.
    creators: Vec<UserId>,

    /// Number of deliveries this record stands for.
    times: u32,
}

impl PropagatedInfo {
    /// A record for a single delivery by `creator`.
    pub fn new(info: InfoId, timestamp: i64, creator: UserId) -> Self {
        Self { info, timestamp, creators: vec![creator], times: 1 }
    }

    /// A record for simultaneous deliveries by several creators.
    pub fn with_creators(info: InfoId, timestamp: i64, mut creators: Vec<UserId>) -> Self {
        creators.sort();
        creators.dedup();
        let times = creators.len() as u32;
        Self { info, timestamp, creators, times }
    }

    pub fn creators(&self) -> &[UserId] {
        &self.creators
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    /// Override the delivery count (used when deliveries are deduplicated by
    /// creator upstream but the raw count must be preserved).
    pub fn set_times(&mut self, times: u32) {
        self.times = times;
    }

    /// Merge another record for the same piece into this one.
    ///
    /// Creator sets union; `times` is recomputed as the union size under
    /// `Unique` or as the sum of both counts under `Repetition`.  The
    /// timestamp keeps the earlier arrival.
    ///
    /// # Panics
    /// Debug-asserts that both records refer to the same piece.
    pub fn merge(&mut self, other: &PropagatedInfo, mode: CountingMode) {
        debug_assert_eq!(self.info, other.info);
        for &c in &other.creators {
            if let Err(pos) = self.creators.binary_search(&c) {
                self.creators.insert(pos, c);
            }
        }
        self.times = match mode {
            CountingMode::Unique => self.creators.len() as u32,
            CountingMode::Repetition => self.times + other.times,
        };
        self.timestamp = self.timestamp.min(other.timestamp);
    }
}
