//! Unit tests for the four policy families.

use nd_core::{CountingMode, InfoId, SimRng, UserId, UserRng};
use nd_data::{Data, InfoPiece, PropagatedInfo, UserState};
use nd_graph::{AdjacencyGraphBuilder, EdgeKind, EdgeOrientation};

use crate::*;

fn u(i: u32) -> UserId {
    UserId(i)
}

fn p(i: u32) -> InfoId {
    InfoId(i)
}

fn rng() -> UserRng {
    UserRng::new(42, u(0))
}

const MODE: CountingMode = CountingMode::Unique;

/// Triangle over training edges, plus one recommended edge 0 → 2.
fn triangle_data() -> Data {
    let mut b = AdjacencyGraphBuilder::undirected(3);
    b.add_edge(u(0), u(1), EdgeKind::TRAINING);
    b.add_edge(u(1), u(2), EdgeKind::TRAINING);
    b.add_edge(u(0), u(2), EdgeKind::RECOMMENDED);
    let pieces = vec![
        InfoPiece::new(p(0), u(0), 0),
        InfoPiece::new(p(1), u(1), 1),
        InfoPiece::new(p(2), u(2), 2),
    ];
    Data::new(Box::new(b.build()), pieces).unwrap()
}

/// Training-only line 0 — 1.
fn plain_data() -> Data {
    let mut b = AdjacencyGraphBuilder::undirected(2);
    b.add_edge(u(0), u(1), EdgeKind::TRAINING);
    Data::new(Box::new(b.build()), vec![InfoPiece::new(p(0), u(0), 0)]).unwrap()
}

fn received(user: u32, pieces: &[(u32, u32)]) -> UserState {
    let mut s = UserState::new(u(user));
    for &(piece, creator) in pieces {
        s.deliver(PropagatedInfo::new(p(piece), 0, u(creator)), MODE);
    }
    s
}

// ── Sight ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sight {
    use super::*;

    #[test]
    fn all_sight_excludes_propagated_only() {
        let data = triangle_data();
        let mut state = received(0, &[(1, 1), (2, 2)]);
        state.add_seen(PropagatedInfo::new(p(1), 0, u(1)), MODE);
        state.commit_propagated(p(1), MODE).unwrap();

        let mut r = rng();
        let seen = AllSight.select(&state, &data, &mut r);
        let ids: Vec<InfoId> = seen.iter().map(|s| s.info).collect();
        assert_eq!(ids, vec![p(2)]);
    }

    #[test]
    fn not_discarded_sight_keeps_propagated_visible() {
        let data = triangle_data();
        let mut state = UserState::new(u(0));
        state.add_own(PropagatedInfo::new(p(0), 0, u(0)));
        state.add_seen(PropagatedInfo::new(p(0), 0, u(0)), MODE);
        state.commit_propagated(p(0), MODE).unwrap();

        let mut r = rng();
        assert!(AllNotDiscardedSight
            .select(&state, &data, &mut r)
            .iter()
            .any(|s| s.info == p(0)));
        assert!(AllNotDiscardedNorPropagatedSight
            .select(&state, &data, &mut r)
            .is_empty());
    }

    #[test]
    fn deterministic_sight_is_idempotent() {
        let data = triangle_data();
        let state = received(0, &[(1, 1)]);
        let piece = state.received().next().unwrap().clone();
        let mut r = rng();
        let first = AllSight.sees(&state, &data, &piece, &mut r);
        let second = AllSight.sees(&state, &data, &piece, &mut r);
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn count_sight_caps_per_iteration() {
        let data = triangle_data();
        let mechanism = CountSight::new(2);
        let mut state = received(0, &[(0, 1), (1, 1), (2, 1)]);
        // Two extra pending pieces under fresh ids to reach five candidates.
        state.deliver(PropagatedInfo::new(p(3), 0, u(1)), MODE);
        state.deliver(PropagatedInfo::new(p(4), 0, u(1)), MODE);

        let mut r = rng();
        let seen = mechanism.select(&state, &data, &mut r);
        assert_eq!(seen.len(), 2, "five pending, sees exactly two");

        // Resolve the observed two; the cap restarts next iteration over the
        // remaining three.
        for rec in &seen {
            state.add_seen(rec.clone(), MODE);
            state.commit_discarded(rec.info, MODE).unwrap();
        }
        let next = mechanism.select(&state, &data, &mut r);
        assert_eq!(next.len(), 2);
        for rec in &next {
            assert!(!seen.iter().any(|s| s.info == rec.info), "terminal pieces stay out");
        }
    }

    #[test]
    fn recommended_sight_requires_recommended_creator() {
        let data = triangle_data();
        let mut mechanism = AllRecommendedSight::new(EdgeOrientation::Und);
        mechanism.reset_selections(&data);

        // User 0's recommended neighborhood is {2}.
        let state = received(0, &[(1, 1), (2, 2)]);
        let mut r = rng();
        let from_train = state.received().find(|rec| rec.creators() == [u(1)]).unwrap();
        let from_rec = state.received().find(|rec| rec.creators() == [u(2)]).unwrap();
        assert!(!mechanism.sees(&state, &data, from_train, &mut r));
        assert!(mechanism.sees(&state, &data, from_rec, &mut r));
    }

    #[test]
    fn recommended_sight_validation_fails_without_recommended_edges() {
        let data = plain_data();
        assert!(AllRecommendedSight::new(EdgeOrientation::Und).validate(&data).is_err());
        assert!(RecommendedProbabilitySight::new(0.5, 0.5, EdgeOrientation::Und)
            .validate(&data)
            .is_err());
        assert!(AllSight.validate(&data).is_ok());
    }

    #[test]
    fn probability_sight_extremes() {
        let data = triangle_data();
        let state = received(0, &[(1, 1)]);
        let piece = state.received().next().unwrap().clone();
        let mut r = rng();

        let mut certain = RecommendedProbabilitySight::new(1.0, 1.0, EdgeOrientation::Und);
        certain.reset_selections(&data);
        assert!(certain.sees(&state, &data, &piece, &mut r));

        let mut never = RecommendedProbabilitySight::new(0.0, 0.0, EdgeOrientation::Und);
        never.reset_selections(&data);
        assert!(!never.sees(&state, &data, &piece, &mut r));
    }
}

// ── Propagation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod propagation {
    use super::*;

    fn target_of(mechanism: &PushPropagation, data: &Data, user: u32) -> Option<UserId> {
        let state = UserState::new(u(user));
        mechanism
            .destinations(&PropagatedInfo::new(p(0), 0, u(user)), &state, data)
            .first()
            .copied()
    }

    #[test]
    fn push_respects_recency_window() {
        let data = triangle_data();
        let mut mechanism = PushPropagation::new(1, EdgeOrientation::Und);
        let mut rng = SimRng::new(7);

        mechanism.reset_selections(&data, &mut rng);
        let first = target_of(&mechanism, &data, 0).expect("two neighbors available");

        mechanism.reset_selections(&data, &mut rng);
        let second = target_of(&mechanism, &data, 0).expect("one neighbor still eligible");
        assert_ne!(second, first, "window of 1 blocks an immediate repeat");

        mechanism.reset_selections(&data, &mut rng);
        let third = target_of(&mechanism, &data, 0).expect("window aged out");
        assert_eq!(third, first, "with two neighbors the pick alternates");
    }

    #[test]
    fn push_single_neighbor_skips_then_returns() {
        let data = plain_data();
        let mut mechanism = PushPropagation::new(1, EdgeOrientation::Und);
        let mut rng = SimRng::new(7);

        mechanism.reset_selections(&data, &mut rng);
        assert_eq!(target_of(&mechanism, &data, 0), Some(u(1)));

        // Only neighbor is in the window: no pick, but the sentinel entry
        // keeps the window moving.
        mechanism.reset_selections(&data, &mut rng);
        assert_eq!(target_of(&mechanism, &data, 0), None);

        mechanism.reset_selections(&data, &mut rng);
        assert_eq!(target_of(&mechanism, &data, 0), Some(u(1)));
    }

    #[test]
    fn push_is_piece_independent() {
        assert!(!PushPropagation::new(1, EdgeOrientation::Und).depends_on_piece());
    }

    #[test]
    fn pull_push_registers_pairs_symmetrically() {
        let data = triangle_data();
        let mut mechanism = PullPushPropagation::new(1, EdgeOrientation::Und, 0.0);
        let mut rng = SimRng::new(11);
        mechanism.reset_selections(&data, &mut rng);

        for a in 0..3u32 {
            let state = UserState::new(u(a));
            for b in mechanism.destinations(&PropagatedInfo::new(p(0), 0, u(a)), &state, &data) {
                let back = mechanism.destinations(
                    &PropagatedInfo::new(p(0), 0, b),
                    &UserState::new(b),
                    &data,
                );
                assert!(back.contains(&u(a)), "{b} must list {} back", u(a));
            }
        }
    }

    #[test]
    fn pull_push_full_bias_prefers_recommended_pool() {
        let data = triangle_data();
        let mut mechanism = PullPushPropagation::new(0, EdgeOrientation::Und, 1.0);
        let mut rng = SimRng::new(3);
        mechanism.reset_selections(&data, &mut rng);

        // User 0's only recommended neighbor is 2, so with certainty bias the
        // pick is 2 (window size 0 never blocks it).
        let state = UserState::new(u(0));
        let dests = mechanism.destinations(&PropagatedInfo::new(p(0), 0, u(0)), &state, &data);
        assert!(dests.contains(&u(2)));
    }

    #[test]
    fn pull_push_falls_back_when_preferred_pool_empty() {
        // Full recommended bias on a graph with no recommended edges: the
        // training pool stands in and gossip still happens.
        let data = plain_data();
        let mut mechanism = PullPushPropagation::new(0, EdgeOrientation::Und, 1.0);
        let mut rng = SimRng::new(3);
        mechanism.reset_selections(&data, &mut rng);

        let state = UserState::new(u(0));
        let dests = mechanism.destinations(&PropagatedInfo::new(p(0), 0, u(0)), &state, &data);
        assert_eq!(dests, vec![u(1)]);
    }

    #[test]
    fn all_recommended_neighbors_targets_and_validation() {
        let data = triangle_data();
        let mut mechanism = AllRecommendedNeighbors::new(EdgeOrientation::Und);
        assert!(mechanism.validate(&data).is_ok());

        let mut rng = SimRng::new(1);
        mechanism.reset_selections(&data, &mut rng);

        let state = UserState::new(u(0));
        let dests = mechanism.destinations(&PropagatedInfo::new(p(0), 0, u(0)), &state, &data);
        assert_eq!(dests, vec![u(2)]);

        let dests = mechanism.destinations(
            &PropagatedInfo::new(p(0), 0, u(1)),
            &UserState::new(u(1)),
            &data,
        );
        assert!(dests.is_empty(), "user 1 has no recommended edges");

        assert!(AllRecommendedNeighbors::new(EdgeOrientation::Und)
            .validate(&plain_data())
            .is_err());
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod selection {
    use super::*;

    #[test]
    fn propagate_all_forwards_everything() {
        let data = triangle_data();
        let state = received(0, &[(1, 1)]);
        let piece = state.received().next().unwrap().clone();
        let mut r = rng();
        assert_eq!(
            PropagateAllSelection.resolve(&state, &data, &piece, &mut r),
            Resolution::Propagate
        );
    }

    #[test]
    fn probabilistic_extremes() {
        let data = triangle_data();
        let state = received(0, &[(1, 1)]);
        let piece = state.received().next().unwrap().clone();
        let mut r = rng();
        assert_eq!(
            ProbabilisticSelection::new(1.0).resolve(&state, &data, &piece, &mut r),
            Resolution::Propagate
        );
        assert_eq!(
            ProbabilisticSelection::new(0.0).resolve(&state, &data, &piece, &mut r),
            Resolution::Discard
        );
    }

    #[test]
    fn terminal_membership_forces_resolution() {
        let data = triangle_data();
        let mut state = received(0, &[(1, 1)]);
        state.add_seen(PropagatedInfo::new(p(1), 0, u(1)), MODE);
        state.commit_discarded(p(1), MODE).unwrap();

        let piece = PropagatedInfo::new(p(1), 1, u(2));
        let mut r = rng();
        // An always-propagate policy cannot flip a discarded piece…
        assert_eq!(
            ProbabilisticSelection::new(1.0).resolve(&state, &data, &piece, &mut r),
            Resolution::Discard
        );
        // …and a propagated piece resolves to Propagate under any policy.
        let mut state = received(0, &[(2, 2)]);
        state.add_seen(PropagatedInfo::new(p(2), 0, u(2)), MODE);
        state.commit_propagated(p(2), MODE).unwrap();
        assert_eq!(
            ProbabilisticSelection::new(0.0).resolve(&state, &data, &piece_with(p(2)), &mut r),
            Resolution::Propagate
        );
    }

    fn piece_with(id: InfoId) -> PropagatedInfo {
        PropagatedInfo::new(id, 1, u(9))
    }

    #[test]
    fn feature_filter_thresholds() {
        let mut b = AdjacencyGraphBuilder::undirected(2);
        b.add_edge(u(0), u(1), EdgeKind::TRAINING);
        let mut hot = InfoPiece::new(p(0), u(0), 0);
        hot.features = vec![(nd_core::FeatureId(0), 0.9)];
        let cold = InfoPiece::new(p(1), u(1), 0);
        let data = Data::new(Box::new(b.build()), vec![hot, cold])
            .unwrap()
            .with_feature_names(vec!["topic".into()]);

        let mechanism = FeatureFilterSelection::new(nd_core::FeatureId(0), 0.5);
        assert!(mechanism.validate(&data).is_ok());

        let state = received(0, &[(0, 1), (1, 1)]);
        let mut r = rng();
        assert_eq!(
            mechanism.resolve(&state, &data, &piece_with(p(0)), &mut r),
            Resolution::Propagate
        );
        assert_eq!(
            mechanism.resolve(&state, &data, &piece_with(p(1)), &mut r),
            Resolution::Discard,
            "missing feature counts as 0"
        );
    }

    #[test]
    fn feature_filter_validation_rejects_unknown_feature() {
        let data = plain_data();
        let mechanism = FeatureFilterSelection::new(nd_core::FeatureId(3), 0.5);
        assert!(mechanism.validate(&data).is_err());
    }
}

// ── Stop conditions ───────────────────────────────────────────────────────────

#[cfg(test)]
mod stop {
    use super::*;

    fn summary() -> IterationSummary {
        IterationSummary {
            iteration:         4,
            propagated_pieces: 3,
            propagating_users: 2,
            newly_seen:        5,
            total_propagated:  40,
            timestamp:         Some(100),
        }
    }

    #[test]
    fn max_iterations() {
        let data = plain_data();
        assert!(!MaxIterationsStop::new(10).check_stop(&summary(), &data));
        assert!(MaxIterationsStop::new(5).check_stop(&summary(), &data));
    }

    #[test]
    fn no_more_new() {
        let data = plain_data();
        assert!(!NoMoreNewStop.check_stop(&summary(), &data));
        let quiet = IterationSummary { newly_seen: 0, ..summary() };
        assert!(NoMoreNewStop.check_stop(&quiet, &data));
    }

    #[test]
    fn no_more_propagated() {
        let data = plain_data();
        assert!(!NoMorePropagatedStop.check_stop(&summary(), &data));
        let quiet = IterationSummary { propagated_pieces: 0, ..summary() };
        assert!(NoMorePropagatedStop.check_stop(&quiet, &data));
    }

    #[test]
    fn total_propagated_target() {
        let data = plain_data();
        assert!(!TotalPropagatedStop::new(50).check_stop(&summary(), &data));
        assert!(TotalPropagatedStop::new(40).check_stop(&summary(), &data));
    }

    #[test]
    fn timestamp_bound() {
        let data = plain_data();
        assert!(!MaxTimestampStop::new(100).check_stop(&summary(), &data));
        assert!(MaxTimestampStop::new(99).check_stop(&summary(), &data));
        let exhausted = IterationSummary { timestamp: None, ..summary() };
        assert!(MaxTimestampStop::new(i64::MAX).check_stop(&exhausted, &data));
    }

    #[test]
    fn timestamp_bound_is_conjunctive_with_quiescence() {
        let data = plain_data();
        let past_bound = IterationSummary { timestamp: Some(200), ..summary() };
        assert!(
            !MaxTimestampNoPropagatedStop::new(100).check_stop(&past_bound, &data),
            "still propagating"
        );
        let quiet = IterationSummary { propagated_pieces: 0, ..past_bound };
        assert!(MaxTimestampNoPropagatedStop::new(100).check_stop(&quiet, &data));
        let quiet_early = IterationSummary { propagated_pieces: 0, ..summary() };
        assert!(
            !MaxTimestampNoPropagatedStop::new(100).check_stop(&quiet_early, &data),
            "bound not exceeded yet"
        );
    }
}
