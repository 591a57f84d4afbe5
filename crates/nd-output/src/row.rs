//! Plain data row types written by the tabular backends.

use nd_sim::Iteration;

/// Aggregate counts for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationSummaryRow {
    pub iteration:          u64,
    pub receiving_users:    u64,
    pub seen:               u64,
    pub unique_seen:        u64,
    pub re_receiving_users: u64,
    pub re_received:        u64,
    pub propagating_users:  u64,
    pub propagated:         u64,
    pub discarding_users:   u64,
    pub discarded:          u64,
}

impl IterationSummaryRow {
    pub fn from_iteration(iteration: &Iteration) -> Self {
        Self {
            iteration:          iteration.number(),
            receiving_users:    iteration.num_receiving_users(),
            seen:               iteration.num_seen(),
            unique_seen:        iteration.num_unique_seen(),
            re_receiving_users: iteration.num_re_receiving_users(),
            re_received:        iteration.num_re_received(),
            propagating_users:  iteration.num_propagating_users(),
            propagated:         iteration.num_propagated(),
            discarding_users:   iteration.num_discarding_users(),
            discarded:          iteration.num_discarded(),
        }
    }
}

/// One newly seen (user, piece) pair with its delivering creators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenEventRow {
    pub iteration: u64,
    pub user:      u32,
    pub info:      u32,
    /// Creator ids joined with `|` — keeps the row flat for CSV and SQL.
    pub creators:  String,
}

impl SeenEventRow {
    /// Flatten one iteration's receiving section into rows.
    pub fn from_iteration(iteration: &Iteration) -> Vec<Self> {
        iteration
            .receiving_users()
            .flat_map(|user| {
                iteration.seen_information(user).iter().map(move |(info, creators)| {
                    let joined = creators
                        .iter()
                        .map(|c| c.0.to_string())
                        .collect::<Vec<_>>()
                        .join("|");
                    SeenEventRow {
                        iteration: iteration.number(),
                        user:      user.0,
                        info:      info.0,
                        creators:  joined,
                    }
                })
            })
            .collect()
    }
}
