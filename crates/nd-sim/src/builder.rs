//! Fluent builder for constructing a [`Simulator`].

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use nd_core::{SimConfig, SimRng, UserRngs};
use nd_data::{Data, PropagatedInfo, UserState};
use nd_mechanisms::{PropagationMechanism, SelectionMechanism, SightMechanism, StopCondition};

use crate::{SimResult, Simulation, Simulator};

/// Fluent builder for [`Simulator<S, P, L, C>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, counting mode, iteration cap
/// - [`Data`] — graph + piece catalogue bundle
/// - the four mechanisms (sight, propagation, selection, stop)
///
/// # Optional inputs
///
/// | Method            | Effect                                            |
/// |-------------------|---------------------------------------------------|
/// | `.cancel_flag(f)` | external signal checked between iterations        |
/// | `.resume_from(s)` | continue a persisted run instead of starting cold |
///
/// `build()` validates every mechanism against the data bundle first, so a
/// misconfigured run (say, a recommended-edge policy on a graph without
/// recommended edges) fails here and never mid-run.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimulatorBuilder::new(config, data, sight, propagation, selection, stop)
///     .cancel_flag(Arc::clone(&cancel))
///     .build()?;
/// let trace = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimulatorBuilder<S, P, L, C>
where
    S: SightMechanism,
    P: PropagationMechanism,
    L: SelectionMechanism,
    C: StopCondition,
{
    config:      SimConfig,
    data:        Data,
    sight:       S,
    propagation: P,
    selection:   L,
    stop:        C,
    cancel:      Option<Arc<AtomicBool>>,
    resume:      Option<Resume>,
}

struct Resume {
    next_number:      u64,
    states:           Vec<UserState>,
    total_propagated: u64,
}

impl<S, P, L, C> SimulatorBuilder<S, P, L, C>
where
    S: SightMechanism,
    P: PropagationMechanism,
    L: SelectionMechanism,
    C: StopCondition,
{
    /// Create a builder with all required inputs.
    pub fn new(
        config:      SimConfig,
        data:        Data,
        sight:       S,
        propagation: P,
        selection:   L,
        stop:        C,
    ) -> Self {
        Self {
            config,
            data,
            sight,
            propagation,
            selection,
            stop,
            cancel: None,
            resume: None,
        }
    }

    /// Supply an external cancellation flag.
    ///
    /// The simulator checks it between iterations (never mid-iteration) and,
    /// when raised, returns the well-formed trace of everything completed.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Continue from a previously recorded run.
    ///
    /// The persisted trace is replayed through fresh user states (no
    /// mechanism re-runs), and the new run's iterations number onward from
    /// [`Simulation::next_number`].
    pub fn resume_from(mut self, simulation: &Simulation) -> Self {
        let states = simulation.rebuild_state(&self.data, self.config.counting);
        let total_propagated = simulation.iterations().map(|i| i.num_propagated()).sum();
        self.resume = Some(Resume {
            next_number: simulation.next_number(),
            states,
            total_propagated,
        });
        self
    }

    /// Validate the configuration and return a ready-to-run [`Simulator`].
    pub fn build(self) -> SimResult<Simulator<S, P, L, C>> {
        // ── Fail fast on mechanism/data mismatches ────────────────────────
        self.sight.validate(&self.data)?;
        self.propagation.validate(&self.data)?;
        self.selection.validate(&self.data)?;
        self.stop.validate(&self.data)?;

        let user_count = self.data.user_count();

        let (next_number, states, total_propagated) = match self.resume {
            Some(resume) => (resume.next_number, resume.states, resume.total_propagated),
            None => {
                let mut states: Vec<UserState> =
                    self.data.users().map(UserState::new).collect();
                for user in self.data.users() {
                    for &piece in self.data.authored_by(user) {
                        let timestamp = self
                            .data
                            .piece(piece)
                            .map(|p| p.timestamp)
                            .unwrap_or_default();
                        states[user.index()].add_own(PropagatedInfo::new(piece, timestamp, user));
                    }
                }
                (0, states, 0)
            }
        };

        let rngs = UserRngs::new(user_count, self.config.seed);
        let prop_rng = SimRng::new(self.config.seed).child(1);

        Ok(Simulator {
            rngs,
            prop_rng,
            data: self.data,
            states,
            sight: self.sight,
            propagation: self.propagation,
            selection: self.selection,
            stop: self.stop,
            timestamp_idx: next_number as usize,
            next_number,
            total_propagated,
            stopped: false,
            cancel: self.cancel,
            config: self.config,
        })
    }
}
