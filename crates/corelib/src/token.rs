//! Tokens: positions on the hash ring.
//!
//! The token space is the full `u64` range and wraps around, so the
//! successor of `u64::MAX` is `0`.

use std::fmt;

/// A position on the ring produced by a [`Partitioner`](crate::Partitioner).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Token(pub u64);

impl Token {
    /// Start of the ring.
    pub const MIN: Token = Token(0);
    /// End of the ring.
    pub const MAX: Token = Token(u64::MAX);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_max(&self) -> bool {
        self.0 == u64::MAX
    }

    /// Clockwise distance from `self` to `other` on the ring.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> Token {
        Token(other.0.wrapping_sub(self.0))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
