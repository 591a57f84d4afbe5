//! Top-level simulation configuration.
//!
//! A diffusion run is clocked by an integer iteration counter; the mapping
//! to "real" time is the sorted sequence of creation timestamps carried by
//! the piece catalogue, one timestamp consumed per iteration.  All schedule
//! arithmetic is therefore exact and the stop conditions compare integers.

/// How delivery multiplicity is counted when two records for the same piece
/// merge at the same user.
///
/// A piece delivered by creators `{a, b}` and again by `{b, c}` holds
/// `creators = {a, b, c}` either way; `times` differs:
///
/// - `Unique`: `times = |creators|` (3) — deliveries deduplicated by creator.
/// - `Repetition`: `times` sums the two records' counts — every delivery
///   event counts, repeat senders included.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CountingMode {
    #[default]
    Unique,
    Repetition,
}

/// Top-level simulation configuration.
///
/// Typically built by the application crate and passed to the simulator
/// builder together with the data bundle and the four mechanisms.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Delivery-multiplicity counting mode applied by every merge site.
    pub counting: CountingMode,

    /// Hard cap on the number of iterations, applied on top of the stop
    /// condition as a safety valve against non-converging runs.  `None`
    /// leaves termination entirely to the stop condition.
    pub max_iterations: Option<u64>,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    /// Ignored without the `parallel` feature of `nd-sim`.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// A configuration with the given seed and defaults everywhere else.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            counting: CountingMode::default(),
            max_iterations: None,
            num_threads: None,
        }
    }
}
