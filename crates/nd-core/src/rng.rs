//! Deterministic per-user and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each user gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (user_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive user IDs uniformly across the seed space.
//! This means:
//!
//! - Users never share RNG state (no contention, no ordering dependency).
//! - The same seed produces the same run whether the sight phase runs on one
//!   thread or many, because each draw is attributable to exactly one user.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::UserId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── UserRng ───────────────────────────────────────────────────────────────────

/// Per-user deterministic RNG.
///
/// Created once per user at simulator construction and stored in a parallel
/// `Vec<UserRng>`.  The type is `!Sync` so per-user RNG state cannot be
/// shared across threads — each worker must hold its own disjoint reference.
pub struct UserRng(SmallRng);

impl UserRng {
    /// Seed deterministically from the run's global seed and a user ID.
    pub fn new(global_seed: u64, user: UserId) -> Self {
        let seed = global_seed ^ (user.0 as u64).wrapping_mul(MIXING_CONSTANT);
        UserRng(SmallRng::seed_from_u64(seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice; `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── UserRngs ──────────────────────────────────────────────────────────────────

/// The full set of per-user RNGs, indexed by `UserId`.
///
/// Kept separate from the user-state vector so the simulator can borrow
/// `&mut UserRngs` and `&[UserState]` simultaneously during the read phase.
/// `UserRngs` is `Send` but intentionally not `Sync` — per-user RNG state
/// must never be shared between threads.
pub struct UserRngs {
    pub inner: Vec<UserRng>,
}

impl UserRngs {
    /// Allocate and seed `count` per-user RNGs from `global_seed`.
    pub fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| UserRng::new(global_seed, UserId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one user's RNG.
    #[inline]
    pub fn get_mut(&mut self, user: UserId) -> &mut UserRng {
        &mut self.inner[user.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Return mutable references to the RNGs for a set of users.
    ///
    /// Used by the parallel read phase: the active-user list is zipped with
    /// the returned refs and processed with Rayon.
    ///
    /// # Precondition (enforced by caller)
    ///
    /// `users` must contain no duplicate `UserId`s and all indices must be
    /// in-bounds.  Both hold for the simulator's active list, which is built
    /// by a single ascending scan over the state vector.
    pub fn get_many_mut(&mut self, users: &[UserId]) -> Vec<&mut UserRng> {
        let ptr = self.inner.as_mut_ptr();
        // SAFETY: Every `UserId` in `users` is unique (caller invariant) and
        // within bounds (simulator invariant).  Each pointer therefore
        // aliases a distinct element of `self.inner`, so no two references
        // overlap.
        users
            .iter()
            .map(|u| unsafe { &mut *ptr.add(u.index()) })
            .collect()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global draws (propagation-mechanism neighbor
/// selection during `reset_selections`, and similar once-per-iteration work).
///
/// Used only in single-threaded contexts.  Mechanisms that need independent
/// streams derive them with [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — keeps auxiliary
    /// random streams decoupled from the main one.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a slice; `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
