//! Integration tests for the iteration loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nd_core::{CountingMode, InfoId, SimConfig, UserId, UserRng};
use nd_data::{Data, InfoPiece, PropagatedInfo, UserState};
use nd_graph::{AdjacencyGraphBuilder, EdgeKind, EdgeOrientation};
use nd_mechanisms::{
    AllNotDiscardedNorPropagatedSight, AllNotDiscardedSight, AllRecommendedNeighbors,
    AllRecommendedSight, MaxIterationsStop, NoMorePropagatedStop, ProbabilisticSelection,
    PropagateAllSelection, PullPushPropagation, PushPropagation, Resolution, SelectionMechanism,
};

use crate::{Iteration, NoopObserver, SimObserver, Simulation, SimulatorBuilder};

fn u(i: u32) -> UserId {
    UserId(i)
}

fn p(i: u32) -> InfoId {
    InfoId(i)
}

fn config(seed: u64) -> SimConfig {
    SimConfig::with_seed(seed)
}

/// Undirected triangle of training edges; each user authors one piece.
fn triangle_data() -> Data {
    let mut b = AdjacencyGraphBuilder::undirected(3);
    b.add_edge(u(0), u(1), EdgeKind::TRAINING);
    b.add_edge(u(1), u(2), EdgeKind::TRAINING);
    b.add_edge(u(0), u(2), EdgeKind::TRAINING);
    let pieces = (0..3).map(|i| InfoPiece::new(p(i), u(i), i as i64)).collect();
    Data::new(Box::new(b.build()), pieces).unwrap()
}

/// Directed recommended fan: 0 → {1, 2} → 3, single piece authored by 0.
fn fan_data() -> Data {
    let mut b = AdjacencyGraphBuilder::directed(4);
    b.add_edge(u(0), u(1), EdgeKind::RECOMMENDED);
    b.add_edge(u(0), u(2), EdgeKind::RECOMMENDED);
    b.add_edge(u(1), u(3), EdgeKind::RECOMMENDED);
    b.add_edge(u(2), u(3), EdgeKind::RECOMMENDED);
    let pieces = vec![InfoPiece::new(p(0), u(0), 0)];
    Data::new(Box::new(b.build()), pieces).unwrap()
}

/// Two users joined by one training edge; user 0 authors one piece.
fn pair_data() -> Data {
    let mut b = AdjacencyGraphBuilder::undirected(2);
    b.add_edge(u(0), u(1), EdgeKind::TRAINING);
    let pieces = vec![InfoPiece::new(p(0), u(0), 0)];
    Data::new(Box::new(b.build()), pieces).unwrap()
}

fn sorted_ids<'a>(records: impl Iterator<Item = &'a PropagatedInfo>) -> Vec<InfoId> {
    let mut ids: Vec<InfoId> = records.map(|r| r.info).collect();
    ids.sort();
    ids
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn seeds_own_pieces_from_catalogue() {
        let sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(1),
        )
        .build()
        .unwrap();

        for i in 0..3 {
            assert!(sim.states()[i as usize].contains_own(p(i)));
        }
    }

    #[test]
    fn recommended_mechanism_on_plain_graph_fails_at_build() {
        let result = SimulatorBuilder::new(
            config(42),
            triangle_data(), // no recommended edges
            AllRecommendedSight::new(EdgeOrientation::Und),
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(1),
        )
        .build();
        assert!(result.is_err(), "misconfiguration must fail before the run");

        let result = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            AllRecommendedNeighbors::new(EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(1),
        )
        .build();
        assert!(result.is_err());
    }
}

// ── Basic runs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn max_iterations_cap_numbers_iterations_from_zero() {
        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(5),
        )
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(simulation.initial_number(), 0);
        assert_eq!(simulation.num_iterations(), 5);
        for n in 0..5 {
            assert_eq!(simulation.iteration(n).unwrap().number(), n);
        }
        assert!(simulation.iteration(5).is_none());
        assert!(sim.is_stopped());
    }

    #[test]
    fn hard_cap_halts_non_converging_runs() {
        // NoMorePropagated never fires while AllNotDiscardedSight keeps
        // re-forwarding own pieces; the config cap is the safety valve.
        let mut cfg = config(42);
        cfg.max_iterations = Some(4);
        let mut sim = SimulatorBuilder::new(
            cfg,
            triangle_data(),
            AllNotDiscardedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            NoMorePropagatedStop,
        )
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(simulation.num_iterations(), 4);
        assert!(!sim.is_stopped(), "the cap, not the condition, ended the run");
    }

    #[test]
    fn observer_sees_every_iteration() {
        struct Recorder {
            starts: Vec<u64>,
            ends:   Vec<u64>,
            ended:  bool,
        }
        impl SimObserver for Recorder {
            fn on_iteration_start(&mut self, n: u64) {
                self.starts.push(n);
            }
            fn on_iteration_end(&mut self, iteration: &Iteration) {
                self.ends.push(iteration.number());
            }
            fn on_sim_end(&mut self, _: &Simulation) {
                self.ended = true;
            }
        }

        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(3),
        )
        .build()
        .unwrap();

        let mut obs = Recorder { starts: vec![], ends: vec![], ended: false };
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.starts, vec![0, 1, 2]);
        assert_eq!(obs.ends, vec![0, 1, 2]);
        assert!(obs.ended);
    }

    #[test]
    fn run_iterations_steps_and_resumes_numbering() {
        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(100),
        )
        .build()
        .unwrap();

        let first = sim.run_iterations(2, &mut NoopObserver).unwrap();
        assert_eq!(first.initial_number(), 0);
        assert_eq!(first.num_iterations(), 2);

        let second = sim.run_iterations(3, &mut NoopObserver).unwrap();
        assert_eq!(second.initial_number(), 2);
        assert_eq!(second.iteration(4).unwrap().number(), 4);
    }

    #[test]
    fn timestamp_clock_advances_through_catalogue() {
        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(), // timestamps 0, 1, 2
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(100),
        )
        .build()
        .unwrap();

        assert_eq!(sim.current_timestamp(), Some(0));
        sim.run_iterations(2, &mut NoopObserver).unwrap();
        assert_eq!(sim.current_timestamp(), Some(2));
        sim.run_iterations(2, &mut NoopObserver).unwrap();
        assert_eq!(sim.current_timestamp(), None, "catalogue exhausted");
    }
}

// ── Diffusion semantics ───────────────────────────────────────────────────────

#[cfg(test)]
mod diffusion_tests {
    use super::*;

    #[test]
    fn piece_crosses_an_edge_per_iteration() {
        // Pair graph: iteration 0 forwards the piece from its author to the
        // neighbor, iteration 1 records the neighbor forwarding it back
        // (dropped at the author), iteration 2 is quiet and stops the run.
        let mut sim = SimulatorBuilder::new(
            config(42),
            pair_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(0, EdgeOrientation::Und),
            PropagateAllSelection,
            NoMorePropagatedStop,
        )
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();

        let it0 = simulation.iteration(0).unwrap();
        assert_eq!(it0.propagating_users().collect::<Vec<_>>(), vec![u(0)]);
        assert_eq!(it0.receiving_users().collect::<Vec<_>>(), vec![u(1)]);
        assert_eq!(it0.seen_information(u(1)), &[(p(0), vec![u(0)])]);

        let it1 = simulation.iteration(1).unwrap();
        assert_eq!(it1.propagating_users().collect::<Vec<_>>(), vec![u(1)]);
        assert_eq!(it1.num_receiving_users(), 0, "author drops the echo");

        let last = simulation.iteration(simulation.next_number() - 1).unwrap();
        assert_eq!(last.num_propagating_users(), 0);
        assert!(sim.is_stopped());
    }

    #[test]
    fn no_more_propagated_halts_without_extra_iteration() {
        let mut sim = SimulatorBuilder::new(
            config(42),
            pair_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(0, EdgeOrientation::Und),
            PropagateAllSelection,
            NoMorePropagatedStop,
        )
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();
        let n = simulation.num_iterations();
        assert!(n >= 1);
        // Exactly one quiet iteration at the end, none after it.
        assert_eq!(simulation.iteration(n - 1).unwrap().num_propagating_users(), 0);
        for i in 0..n - 1 {
            assert!(simulation.iteration(i).unwrap().num_propagating_users() > 0);
        }
    }

    #[test]
    fn simultaneous_deliveries_merge_creator_sets() {
        // Fan graph: 1 and 2 both forward piece 0 to user 3 in iteration 1.
        let mut sim = SimulatorBuilder::new(
            config(42),
            fan_data(),
            AllNotDiscardedNorPropagatedSight,
            AllRecommendedNeighbors::new(EdgeOrientation::Out),
            PropagateAllSelection,
            NoMorePropagatedStop,
        )
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();
        let it1 = simulation.iteration(1).unwrap();
        assert_eq!(
            it1.seen_information(u(3)),
            &[(p(0), vec![u(1), u(2)])],
            "one seen entry, creators unioned"
        );

        let record = sim.states()[3]
            .all()
            .find(|r| r.info == p(0))
            .expect("user 3 holds the piece");
        assert_eq!(record.creators(), &[u(1), u(2)]);
        assert_eq!(record.times(), 2, "unique counting: one per creator");
    }

    #[test]
    fn state_partition_holds_after_every_run() {
        let mut sim = SimulatorBuilder::new(
            config(7),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PullPushPropagation::new(1, EdgeOrientation::Und, 0.0),
            ProbabilisticSelection::new(0.5),
            MaxIterationsStop::new(20),
        )
        .build()
        .unwrap();

        sim.run(&mut NoopObserver).unwrap();
        for state in sim.states() {
            assert!(state.check_invariants(), "partition broken for {}", state.user());
        }
    }

    #[test]
    fn all_only_grows() {
        let mut sim = SimulatorBuilder::new(
            config(3),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            ProbabilisticSelection::new(0.7),
            MaxIterationsStop::new(30),
        )
        .build()
        .unwrap();

        let mut floors = vec![0usize; 3];
        for _ in 0..30 {
            sim.run_iterations(1, &mut NoopObserver).unwrap();
            for (i, state) in sim.states().iter().enumerate() {
                assert!(state.all_count() >= floors[i], "all shrank for user {i}");
                floors[i] = state.all_count();
            }
        }
    }

    #[test]
    fn conflicting_selection_aborts_the_run() {
        // Forwards a piece on first sight, then flips to Discard when the
        // not-discarded sight shows it again: the second resolution violates
        // the terminal exclusivity and must abort.
        struct FlipFlop;
        impl SelectionMechanism for FlipFlop {
            fn resolve(
                &self,
                user:  &UserState,
                _:     &Data,
                piece: &PropagatedInfo,
                _:     &mut UserRng,
            ) -> Resolution {
                if user.contains_propagated(piece.info) {
                    Resolution::Discard
                } else {
                    Resolution::Propagate
                }
            }
        }

        let mut sim = SimulatorBuilder::new(
            config(42),
            pair_data(),
            AllNotDiscardedSight,
            PushPropagation::new(0, EdgeOrientation::Und),
            FlipFlop,
            MaxIterationsStop::new(10),
        )
        .build()
        .unwrap();

        let result = sim.run(&mut NoopObserver);
        assert!(matches!(result, Err(crate::SimError::Invariant(_))));
    }
}

// ── Determinism, cancellation, resume ─────────────────────────────────────────

#[cfg(test)]
mod replay_tests {
    use super::*;

    fn stochastic_run(seed: u64) -> Simulation {
        let mut sim = SimulatorBuilder::new(
            config(seed),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PullPushPropagation::new(1, EdgeOrientation::Und, 0.3),
            ProbabilisticSelection::new(0.6),
            MaxIterationsStop::new(15),
        )
        .build()
        .unwrap();
        sim.run(&mut NoopObserver).unwrap()
    }

    #[test]
    fn same_seed_same_trace() {
        assert_eq!(stochastic_run(42), stochastic_run(42));
    }

    #[test]
    fn different_seed_different_trace() {
        // Fifteen stochastic iterations on a triangle; identical traces for
        // different seeds would point at an RNG wiring bug.
        assert_ne!(stochastic_run(42), stochastic_run(43));
    }

    #[test]
    fn preset_cancel_flag_yields_empty_well_formed_trace() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(10),
        )
        .cancel_flag(cancel)
        .build()
        .unwrap();

        let simulation = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(simulation.num_iterations(), 0);
        assert_eq!(simulation.initial_number(), 0);
    }

    #[test]
    fn cancellation_between_iterations_keeps_completed_work() {
        struct CancelAfter {
            flag:  Arc<AtomicBool>,
            after: u64,
        }
        impl SimObserver for CancelAfter {
            fn on_iteration_end(&mut self, iteration: &Iteration) {
                if iteration.number() + 1 >= self.after {
                    self.flag.store(true, Ordering::Relaxed);
                }
            }
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let mut sim = SimulatorBuilder::new(
            config(42),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(100),
        )
        .cancel_flag(Arc::clone(&cancel))
        .build()
        .unwrap();

        let mut obs = CancelAfter { flag: Arc::clone(&cancel), after: 2 };
        let simulation = sim.run(&mut obs).unwrap();
        assert_eq!(simulation.num_iterations(), 2, "cancel lands between iterations");
    }

    #[test]
    fn rebuild_state_matches_live_states() {
        let mut sim = SimulatorBuilder::new(
            config(5),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PullPushPropagation::new(1, EdgeOrientation::Und, 0.0),
            ProbabilisticSelection::new(0.5),
            MaxIterationsStop::new(10),
        )
        .build()
        .unwrap();
        let simulation = sim.run(&mut NoopObserver).unwrap();

        let data = triangle_data();
        let rebuilt = simulation.rebuild_state(&data, CountingMode::Unique);
        for (live, replayed) in sim.states().iter().zip(&rebuilt) {
            assert_eq!(sorted_ids(live.own()), sorted_ids(replayed.own()));
            assert_eq!(sorted_ids(live.received()), sorted_ids(replayed.received()));
            assert_eq!(sorted_ids(live.propagated()), sorted_ids(replayed.propagated()));
            assert_eq!(sorted_ids(live.discarded()), sorted_ids(replayed.discarded()));
            assert_eq!(sorted_ids(live.all()), sorted_ids(replayed.all()));
        }
    }

    #[test]
    fn resumed_run_continues_numbering() {
        let mut first = SimulatorBuilder::new(
            config(5),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(3),
        )
        .build()
        .unwrap();
        let head = first.run(&mut NoopObserver).unwrap();
        assert_eq!(head.next_number(), 3);

        let mut second = SimulatorBuilder::new(
            config(5),
            triangle_data(),
            AllNotDiscardedNorPropagatedSight,
            PushPropagation::new(1, EdgeOrientation::Und),
            PropagateAllSelection,
            MaxIterationsStop::new(6),
        )
        .resume_from(&head)
        .build()
        .unwrap();
        let tail = second.run(&mut NoopObserver).unwrap();

        assert_eq!(tail.initial_number(), 3);
        assert_eq!(tail.iteration(3).unwrap().number(), 3);
        assert!(tail.iteration(0).is_none(), "head iterations live in the head trace");
    }
}

/// Sight-phase purity: evaluating the predicate must not change the state it
/// reads.  (The count-limited mechanism routes its cap through `select`, so
/// the predicate itself stays pure for every built-in.)
#[test]
fn sight_evaluation_leaves_state_untouched() {
    use nd_mechanisms::SightMechanism;

    let data = triangle_data();
    let mut state = UserState::new(u(0));
    state.deliver(PropagatedInfo::new(p(1), 0, u(1)), CountingMode::Unique);
    let before = sorted_ids(state.all());

    let mut rng = UserRng::new(42, u(0));
    let piece = state.received().next().unwrap().clone();
    for _ in 0..3 {
        AllNotDiscardedNorPropagatedSight.sees(&state, &data, &piece, &mut rng);
    }
    assert_eq!(sorted_ids(state.all()), before);
    assert_eq!(state.received_count(), 1);
}
