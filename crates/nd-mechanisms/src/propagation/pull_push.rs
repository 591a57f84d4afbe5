//! Pull-push (rumour-spreading) gossip with recommended-edge bias.

use std::collections::VecDeque;

use nd_core::{SimRng, UserId};
use nd_data::{Data, PropagatedInfo, UserState};
use nd_graph::{reaches_through_recommended, EdgeOrientation};

use super::PropagationMechanism;

/// Each iteration every user picks one partner: the pair exchange whatever
/// each forwards, so the pairing is registered in both users' destination
/// lists (pull and push at once).
///
/// With probability `rec_prob` the pick is attempted from the neighbors
/// reached through recommended edges, otherwise from the training neighbors;
/// whenever the preferred pool is empty after excluding recently visited
/// partners, the other pool stands in.  The per-user recency window works
/// like the push strategy's: FIFO, capped at `wait_time`, fed a sentinel
/// entry on iterations without an eligible partner.
///
/// Setting `rec_prob = 0` on a graph without recommended edges degenerates
/// to the plain rumour-spreading strategy of Demers et al. (PODC 1987).
pub struct PullPushPropagation {
    wait_time:   usize,
    orientation: EdgeOrientation,
    rec_prob:    f64,
    /// Destination lists for this iteration; symmetric by construction.
    pairs: Vec<Vec<UserId>>,
    /// Recency window per user; `None` marks an iteration without a pick.
    windows: Vec<VecDeque<Option<UserId>>>,
}

impl PullPushPropagation {
    pub fn new(wait_time: usize, orientation: EdgeOrientation, rec_prob: f64) -> Self {
        Self {
            wait_time,
            orientation,
            rec_prob,
            pairs: Vec::new(),
            windows: Vec::new(),
        }
    }

    fn ensure_sized(&mut self, users: usize) {
        if self.windows.len() != users {
            self.windows = vec![VecDeque::new(); users];
        }
        self.pairs.clear();
        self.pairs.resize(users, Vec::new());
    }

    fn register_pair(&mut self, a: UserId, b: UserId) {
        if !self.pairs[a.index()].contains(&b) {
            self.pairs[a.index()].push(b);
        }
        if !self.pairs[b.index()].contains(&a) {
            self.pairs[b.index()].push(a);
        }
    }
}

impl PropagationMechanism for PullPushPropagation {
    fn reset_selections(&mut self, data: &Data, rng: &mut SimRng) {
        self.ensure_sized(data.user_count());

        for user in data.users() {
            let window = &self.windows[user.index()];

            let mut rec_pool: Vec<UserId> = Vec::new();
            let mut train_pool: Vec<UserId> = Vec::new();
            for v in data.graph().neighbors(user, self.orientation) {
                if window.contains(&Some(v)) {
                    continue;
                }
                if reaches_through_recommended(data.graph(), user, v, self.orientation) {
                    rec_pool.push(v);
                } else {
                    train_pool.push(v);
                }
            }

            // Empty preferred pool falls back to the other one, in both
            // directions, so a lone-pool user still gossips every iteration.
            let pick = {
                let (preferred, other) = if rng.gen_bool(self.rec_prob) {
                    (&rec_pool, &train_pool)
                } else {
                    (&train_pool, &rec_pool)
                };
                let pool = if preferred.is_empty() { other } else { preferred };
                rng.choose(pool).copied()
            };

            if let Some(v) = pick {
                self.register_pair(user, v);
            }
            let window = &mut self.windows[user.index()];
            window.push_back(pick);
            while window.len() > self.wait_time {
                window.pop_front();
            }
        }
    }

    fn destinations(&self, _: &PropagatedInfo, origin: &UserState, _: &Data) -> Vec<UserId> {
        self.pairs
            .get(origin.user().index())
            .cloned()
            .unwrap_or_default()
    }
}
