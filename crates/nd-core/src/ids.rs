//! Strongly typed, zero-cost identifier wrappers.
//!
//! Users and information pieces are arena indices into the run's `Data`
//! bundle, never owned references to each other — a creator inside a
//! delivery record is a `UserId` pointing back into the global user index.
//! This keeps per-user state trivially cloneable and shardable by user.
//!
//! The inner integer is `pub` to allow direct indexing via `id.0 as usize`,
//! but callers should prefer the `.index()` helper for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a user in the run's user index.  Max ~4.3 billion users.
    pub struct UserId(u32);
}

typed_id! {
    /// Index of an information piece in the run's piece catalogue.
    pub struct InfoId(u32);
}

typed_id! {
    /// Index of a feature in the run's feature registry.
    /// `u16` keeps feature-value vectors compact (max 65,535 features).
    pub struct FeatureId(u16);
}
