//! Neighborhood orientation selector.

use std::fmt;

/// Which neighborhood of a user an enumeration refers to.
///
/// On an undirected graph every variant behaves like [`Und`](Self::Und).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum EdgeOrientation {
    /// Users with an edge *towards* this user (followers).
    In,
    /// Users this user has an edge *towards* (followees).
    Out,
    /// Union of `In` and `Out`.
    #[default]
    Und,
    /// Intersection of `In` and `Out` (reciprocal links).
    Mutual,
}

impl fmt::Display for EdgeOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeOrientation::In => "in",
            EdgeOrientation::Out => "out",
            EdgeOrientation::Und => "und",
            EdgeOrientation::Mutual => "mutual",
        };
        write!(f, "{s}")
    }
}
