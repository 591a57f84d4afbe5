//! cascade — smallest end-to-end demo of the rust_nd diffusion framework.
//!
//! Twelve users on a ring with recommended chords, one information piece per
//! user, pull-push gossip biased towards the recommended links.  Swap the
//! ring for a loaded social graph and the catalogue for a real piece index
//! to run at study scale.

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use nd_core::{CountingMode, InfoId, SimConfig, UserId};
use nd_data::{Data, InfoPiece};
use nd_graph::EdgeOrientation;
use nd_mechanisms::{
    AllNotDiscardedNorPropagatedSight, MaxIterationsStop, ProbabilisticSelection,
    PullPushPropagation,
};
use nd_output::{read_simulation, write_simulation, CsvWriter, SimOutputObserver};
use nd_sim::SimulatorBuilder;

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const USER_COUNT:     usize = 12;
const SEED:           u64   = 42;
const MAX_ITERATIONS: u64   = 40;
/// Probability that a gossip partner is drawn from the recommended pool.
const REC_PROB:       f64   = 0.6;
/// Probability that a seen piece is forwarded rather than discarded.
const FORWARD_PROB:   f64   = 0.8;
/// Iterations a gossip partner stays off-limits after a visit.
const WAIT_TIME:      usize = 2;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== cascade — rust_nd information diffusion ===");
    println!("Users: {USER_COUNT}  |  Max iterations: {MAX_ITERATIONS}  |  Seed: {SEED}");
    println!();

    // 1. Build the network and the piece catalogue: one piece per user,
    //    authored at staggered timestamps.
    let graph = build_network(USER_COUNT);
    let pieces: Vec<InfoPiece> = (0..USER_COUNT)
        .map(|i| InfoPiece::new(InfoId(i as u32), UserId(i as u32), i as i64))
        .collect();
    let data = Data::new(Box::new(graph), pieces)?;
    println!(
        "Graph: {} users, recommended edges: {}",
        data.user_count(),
        data.has_recommended_edges(),
    );

    // 2. Sim config.
    let config = SimConfig {
        seed:           SEED,
        counting:       CountingMode::Unique,
        max_iterations: Some(MAX_ITERATIONS),
        num_threads:    None,
    };

    // 3. Build the simulator: gossip propagation, probabilistic forwarding,
    //    hard iteration cap as the stop condition.
    let mut sim = SimulatorBuilder::new(
        config,
        data,
        AllNotDiscardedNorPropagatedSight,
        PullPushPropagation::new(WAIT_TIME, EdgeOrientation::Und, REC_PROB),
        ProbabilisticSelection::new(FORWARD_PROB),
        MaxIterationsStop::new(MAX_ITERATIONS),
    )
    .build()?;

    // 4. Set up output.
    std::fs::create_dir_all("output/cascade")?;
    let writer = CsvWriter::new(Path::new("output/cascade"))?;
    let mut obs = SimOutputObserver::new(writer);

    // 5. Run.
    let t0 = Instant::now();
    let simulation = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Persist and reload the replay trace.
    let replay_path = Path::new("output/cascade/simulation.ndr");
    write_simulation(replay_path, &simulation)?;
    let restored = read_simulation(replay_path)?;
    assert_eq!(restored, simulation);

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  iterations recorded : {}", simulation.num_iterations());
    println!("  replay file         : {}", replay_path.display());
    println!();

    println!("{:<8} {:<12} {:<12} {:<12}", "Iter", "Receiving", "Propagating", "Discarding");
    println!("{}", "-".repeat(46));
    for iteration in simulation.iterations() {
        println!(
            "{:<8} {:<12} {:<12} {:<12}",
            iteration.number(),
            iteration.num_receiving_users(),
            iteration.num_propagating_users(),
            iteration.num_discarding_users(),
        );
    }
    println!();

    // 8. Final reach per piece: how many users ever held each one.
    println!("{:<8} {:<8}", "Piece", "Reach");
    println!("{}", "-".repeat(16));
    for piece in 0..USER_COUNT as u32 {
        let reach = sim
            .states()
            .iter()
            .filter(|s| s.contains_any(InfoId(piece)))
            .count();
        println!("{:<8} {:<8}", piece, reach);
    }

    Ok(())
}
