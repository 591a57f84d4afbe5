//! Push gossip: one random neighbor per user per iteration.

use std::collections::VecDeque;

use nd_core::{SimRng, UserId};
use nd_data::{Data, PropagatedInfo, UserState};
use nd_graph::EdgeOrientation;

use super::PropagationMechanism;

/// Each iteration every user picks exactly one neighbor, uniformly at
/// random, and pushes all of that iteration's forwarded pieces to it.
///
/// A per-user sliding window remembers the last `wait_time` picks; neighbors
/// inside the window are ineligible.  When every neighbor is inside the
/// window the user selects nobody, and a sentinel entry still enters the
/// window so old visits keep aging out.
///
/// The strategy follows the classic epidemic-gossip push round: Demers et
/// al., "Epidemic algorithms for replicated database maintenance", PODC 1987.
pub struct PushPropagation {
    wait_time:   usize,
    orientation: EdgeOrientation,
    /// Neighbor selected for each user this iteration.
    targets: Vec<Option<UserId>>,
    /// Recency window per user; `None` marks an iteration without a pick.
    windows: Vec<VecDeque<Option<UserId>>>,
}

impl PushPropagation {
    pub fn new(wait_time: usize, orientation: EdgeOrientation) -> Self {
        Self {
            wait_time,
            orientation,
            targets: Vec::new(),
            windows: Vec::new(),
        }
    }

    fn ensure_sized(&mut self, users: usize) {
        if self.windows.len() != users {
            self.windows = vec![VecDeque::new(); users];
        }
        self.targets.clear();
        self.targets.resize(users, None);
    }
}

impl PropagationMechanism for PushPropagation {
    fn reset_selections(&mut self, data: &Data, rng: &mut SimRng) {
        self.ensure_sized(data.user_count());

        for user in data.users() {
            let window = &mut self.windows[user.index()];
            let neighbors = data.graph().neighbors(user, self.orientation);
            let eligible: Vec<UserId> = neighbors
                .into_iter()
                .filter(|v| !window.contains(&Some(*v)))
                .collect();

            let pick = rng.choose(&eligible).copied();
            self.targets[user.index()] = pick;
            window.push_back(pick);
            while window.len() > self.wait_time {
                window.pop_front();
            }
        }
    }

    fn destinations(&self, _: &PropagatedInfo, origin: &UserState, _: &Data) -> Vec<UserId> {
        match self.targets.get(origin.user().index()) {
            Some(&Some(v)) => vec![v],
            _ => vec![],
        }
    }
}
